//! Built-in control-flow graphs for `lanes liveness`.

use lanes_ir::{Function, FunctionBuilder, Opcode};

/// A named CFG shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sample {
    /// Two blocks, no branches.
    Straight,
    /// If/else merging through a phi.
    Diamond,
    /// A counted loop over a buffer.
    Loop,
    /// A loop nested in a loop.
    Nested,
}

impl Sample {
    pub const ALL: &'static [Sample] = &[
        Sample::Straight,
        Sample::Diamond,
        Sample::Loop,
        Sample::Nested,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sample::Straight => "straight",
            Sample::Diamond => "diamond",
            Sample::Loop => "loop",
            Sample::Nested => "nested",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Sample::Straight => "two blocks, a value crossing the edge",
            Sample::Diamond => "if/else joined by a phi",
            Sample::Loop => "counted loop reading and writing a buffer",
            Sample::Nested => "row loop around a column loop",
        }
    }

    pub fn parse(name: &str) -> Option<Sample> {
        Self::ALL.iter().copied().find(|sample| sample.name() == name)
    }

    pub fn build(self) -> Function {
        match self {
            Sample::Straight => straight(),
            Sample::Diamond => diamond(),
            Sample::Loop => counted_loop(),
            Sample::Nested => nested(),
        }
    }
}

fn straight() -> Function {
    let mut fb = FunctionBuilder::new("straight");
    let a = fb.param("a");
    let b = fb.param("b");
    let next = fb.new_block("next");

    let x = fb.emit(Opcode::Add, &[a, b]);
    fb.set_name(x, "x");
    fb.terminate_jump(next);

    fb.position_at(next);
    let y = fb.emit(Opcode::Mul, &[x, a]);
    fb.set_name(y, "y");
    fb.terminate_return(Some(y));
    fb.finish()
}

fn diamond() -> Function {
    let mut fb = FunctionBuilder::new("diamond");
    let a = fb.param("a");
    let b = fb.param("b");
    let one = fb.constant(1);
    let then_bb = fb.new_block("then");
    let else_bb = fb.new_block("else");
    let join = fb.new_block("join");

    let cond = fb.emit(Opcode::CmpLt, &[a, b]);
    fb.set_name(cond, "cond");
    fb.terminate_branch(cond, then_bb, else_bb);

    fb.position_at(then_bb);
    let t = fb.emit(Opcode::Add, &[a, one]);
    fb.set_name(t, "t");
    fb.terminate_jump(join);

    fb.position_at(else_bb);
    let e = fb.emit(Opcode::Sub, &[b, one]);
    fb.set_name(e, "e");
    fb.terminate_jump(join);

    fb.position_at(join);
    let merged = fb.emit_phi();
    fb.set_name(merged, "m");
    fb.add_incoming(merged, then_bb, t);
    fb.add_incoming(merged, else_bb, e);
    let r = fb.emit(Opcode::Add, &[merged, a]);
    fb.set_name(r, "r");
    fb.terminate_return(Some(r));
    fb.finish()
}

/// `for (i = 0; i < n; i++) buf[i] = buf[i] + 1;`
fn counted_loop() -> Function {
    let mut fb = FunctionBuilder::new("loop");
    let buf = fb.param("buf");
    let n = fb.param("n");
    let zero = fb.constant(0);
    let one = fb.constant(1);
    let header = fb.new_block("header");
    let body = fb.new_block("body");
    let exit = fb.new_block("exit");

    fb.terminate_jump(header);

    fb.position_at(header);
    let i = fb.emit_phi();
    fb.set_name(i, "i");
    let cond = fb.emit(Opcode::CmpLt, &[i, n]);
    fb.set_name(cond, "cond");
    fb.terminate_branch(cond, body, exit);

    fb.position_at(body);
    let v = fb.emit(Opcode::Load, &[buf, i]);
    fb.set_name(v, "v");
    let w = fb.emit(Opcode::Add, &[v, one]);
    fb.set_name(w, "w");
    fb.emit_effect(Opcode::Store, &[buf, i, w]);
    let next = fb.emit(Opcode::Add, &[i, one]);
    fb.set_name(next, "next");
    fb.terminate_jump(header);

    fb.add_incoming(i, fb.entry_block(), zero);
    fb.add_incoming(i, body, next);

    fb.position_at(exit);
    fb.terminate_return(None);
    fb.finish()
}

/// `for (r = 0; r < rows; r++) for (c = 0; c < cols; c++) out[r*cols + c] = r + c;`
fn nested() -> Function {
    let mut fb = FunctionBuilder::new("nested");
    let out = fb.param("out");
    let rows = fb.param("rows");
    let cols = fb.param("cols");
    let zero = fb.constant(0);
    let one = fb.constant(1);
    let outer = fb.new_block("outer");
    let inner = fb.new_block("inner");
    let body = fb.new_block("body");
    let latch = fb.new_block("latch");
    let exit = fb.new_block("exit");

    fb.terminate_jump(outer);

    fb.position_at(outer);
    let r = fb.emit_phi();
    fb.set_name(r, "r");
    let more_rows = fb.emit(Opcode::CmpLt, &[r, rows]);
    fb.terminate_branch(more_rows, inner, exit);

    fb.position_at(inner);
    let c = fb.emit_phi();
    fb.set_name(c, "c");
    let more_cols = fb.emit(Opcode::CmpLt, &[c, cols]);
    fb.terminate_branch(more_cols, body, latch);

    fb.position_at(body);
    let row_base = fb.emit(Opcode::Mul, &[r, cols]);
    let slot = fb.emit(Opcode::Add, &[row_base, c]);
    let value = fb.emit(Opcode::Add, &[r, c]);
    fb.emit_effect(Opcode::Store, &[out, slot, value]);
    let next_c = fb.emit(Opcode::Add, &[c, one]);
    fb.set_name(next_c, "c.next");
    fb.terminate_jump(inner);

    fb.position_at(latch);
    let next_r = fb.emit(Opcode::Add, &[r, one]);
    fb.set_name(next_r, "r.next");
    fb.terminate_jump(outer);

    fb.add_incoming(r, fb.entry_block(), zero);
    fb.add_incoming(r, latch, next_r);
    fb.add_incoming(c, outer, zero);
    fb.add_incoming(c, body, next_c);

    fb.position_at(exit);
    fb.terminate_return(None);
    fb.finish()
}
