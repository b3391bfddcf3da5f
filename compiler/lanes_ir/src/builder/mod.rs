//! Incremental construction of [`Function`]s.
//!
//! Follows the "position at a block, emit instructions, terminate" pattern
//! of LLVM's `IRBuilder`. Phis are always inserted into the phi prefix of
//! the current block, and their incoming edges may be added later so loop
//! back edges can reference values defined after the header.

use smallvec::SmallVec;

use crate::function::{
    Block, BlockId, Function, Instr, InstrKind, Opcode, PhiIncoming, ValueDef, ValueId, ValueKind,
};

struct BlockBuilder {
    id: BlockId,
    name: String,
    instrs: Vec<Instr>,
    succs: SmallVec<[BlockId; 2]>,
    terminated: bool,
}

impl BlockBuilder {
    fn new(id: BlockId, name: String) -> Self {
        Self {
            id,
            name,
            instrs: Vec::new(),
            succs: SmallVec::new(),
            terminated: false,
        }
    }
}

/// Builder for a [`Function`].
///
/// Created with an `entry` block already allocated and selected.
pub struct FunctionBuilder {
    name: String,
    params: Vec<ValueId>,
    values: Vec<ValueDef>,
    blocks: Vec<BlockBuilder>,
    current_block: BlockId,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            values: Vec::new(),
            blocks: vec![BlockBuilder::new(BlockId::new(0), "entry".to_owned())],
            current_block: BlockId::new(0),
        }
    }

    // Block management

    /// Allocate a new empty block and return its ID.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    pub fn new_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(BlockBuilder::new(id, name.into()));
        id
    }

    /// Set the current insertion point to the given block.
    pub fn position_at(&mut self, block: BlockId) {
        debug_assert!(
            block.index() < self.blocks.len(),
            "BlockId {} out of bounds (have {} blocks)",
            block.raw(),
            self.blocks.len(),
        );
        self.current_block = block;
    }

    #[inline]
    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    #[inline]
    pub fn entry_block(&self) -> BlockId {
        BlockId::new(0)
    }

    // Values

    #[expect(
        clippy::cast_possible_truncation,
        reason = "value indices never exceed u32"
    )]
    fn fresh_value(&mut self, kind: ValueKind, name: Option<String>) -> ValueId {
        let id = ValueId::new(self.values.len() as u32);
        self.values.push(ValueDef { kind, name });
        id
    }

    /// Declare the next function parameter.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "parameter counts never exceed u32"
    )]
    pub fn param(&mut self, name: impl Into<String>) -> ValueId {
        let index = self.params.len() as u32;
        let value = self.fresh_value(ValueKind::Param { index }, Some(name.into()));
        self.params.push(value);
        value
    }

    /// Create an integer constant. Constants belong to no block.
    pub fn constant(&mut self, value: i64) -> ValueId {
        self.fresh_value(ValueKind::Const(value), None)
    }

    /// Give an existing value a printable name.
    pub fn set_name(&mut self, value: ValueId, name: impl Into<String>) {
        if let Some(def) = self.values.get_mut(value.index()) {
            def.name = Some(name.into());
        }
    }

    // Instruction emission

    /// Emit a value-producing operation in the current block.
    pub fn emit(&mut self, opcode: Opcode, args: &[ValueId]) -> ValueId {
        let block = self.current_block;
        let dst = self.fresh_value(ValueKind::Instr { block }, None);
        self.push_instr(Instr {
            dst: Some(dst),
            kind: InstrKind::Op {
                opcode,
                args: args.iter().copied().collect(),
            },
        });
        dst
    }

    /// Emit an operation with no result (e.g. a store).
    pub fn emit_effect(&mut self, opcode: Opcode, args: &[ValueId]) {
        self.push_instr(Instr {
            dst: None,
            kind: InstrKind::Op {
                opcode,
                args: args.iter().copied().collect(),
            },
        });
    }

    /// Emit an empty phi at the end of the current block's phi prefix.
    pub fn emit_phi(&mut self) -> ValueId {
        let block = self.current_block;
        let dst = self.fresh_value(ValueKind::Instr { block }, None);
        let bb = &mut self.blocks[block.index()];
        let at = bb.instrs.iter().take_while(|instr| instr.is_phi()).count();
        bb.instrs.insert(
            at,
            Instr {
                dst: Some(dst),
                kind: InstrKind::Phi {
                    incoming: Vec::new(),
                },
            },
        );
        dst
    }

    /// Add an incoming edge `(pred, value)` to the phi defining `phi`.
    ///
    /// Returns `false` if `phi` is not a phi result.
    pub fn add_incoming(&mut self, phi: ValueId, pred: BlockId, value: ValueId) -> bool {
        let Some(ValueKind::Instr { block }) = self.values.get(phi.index()).map(|def| def.kind)
        else {
            return false;
        };
        for instr in &mut self.blocks[block.index()].instrs {
            if instr.dst != Some(phi) {
                continue;
            }
            if let InstrKind::Phi { incoming } = &mut instr.kind {
                incoming.push(PhiIncoming { block: pred, value });
                return true;
            }
            return false;
        }
        false
    }

    fn push_instr(&mut self, instr: Instr) {
        let bb = &mut self.blocks[self.current_block.index()];
        debug_assert!(
            !bb.terminated,
            "block {} already terminated",
            self.current_block.raw()
        );
        bb.instrs.push(instr);
    }

    fn terminate(&mut self, opcode: Opcode, args: &[ValueId], succs: &[BlockId]) {
        self.emit_effect(opcode, args);
        let bb = &mut self.blocks[self.current_block.index()];
        bb.succs.extend_from_slice(succs);
        bb.terminated = true;
    }

    /// Terminate with an unconditional jump.
    pub fn terminate_jump(&mut self, target: BlockId) {
        self.terminate(Opcode::Jump, &[], &[target]);
    }

    /// Terminate with a conditional branch. Successor order is
    /// `then_block`, `else_block`.
    pub fn terminate_branch(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        self.terminate(Opcode::Branch, &[cond], &[then_block, else_block]);
    }

    /// Terminate with a return.
    pub fn terminate_return(&mut self, value: Option<ValueId>) {
        match value {
            Some(v) => self.terminate(Opcode::Return, &[v], &[]),
            None => self.terminate(Opcode::Return, &[], &[]),
        }
    }

    /// Consume the builder and produce a finished [`Function`].
    ///
    /// Predecessor lists are derived from the successor edges. Blocks left
    /// unterminated get a bare return (with a tracing warning).
    pub fn finish(self) -> Function {
        let mut preds: Vec<SmallVec<[BlockId; 4]>> = vec![SmallVec::new(); self.blocks.len()];
        for bb in &self.blocks {
            for &succ in &bb.succs {
                if let Some(list) = preds.get_mut(succ.index()) {
                    if !list.contains(&bb.id) {
                        list.push(bb.id);
                    }
                }
            }
        }

        let blocks = self
            .blocks
            .into_iter()
            .zip(preds)
            .map(|(mut bb, preds)| {
                if !bb.terminated {
                    tracing::warn!(block = bb.id.raw(), "unterminated block, adding return");
                    bb.instrs.push(Instr {
                        dst: None,
                        kind: InstrKind::Op {
                            opcode: Opcode::Return,
                            args: SmallVec::new(),
                        },
                    });
                }
                Block {
                    id: bb.id,
                    name: bb.name,
                    instrs: bb.instrs,
                    succs: bb.succs,
                    preds,
                }
            })
            .collect();

        Function {
            name: self.name,
            params: self.params,
            blocks,
            entry: BlockId::new(0),
            values: self.values,
        }
    }
}
