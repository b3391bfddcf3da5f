//! Single-pass liveness over a phi-bearing, possibly cyclic CFG.
//!
//! # Algorithm
//!
//! One depth-first walk from the entry block. Each block is visited exactly
//! once, and its sets are final when its visit returns:
//!
//! 1. For each successor `s` of block `b`, in terminator order:
//!    - **Back edge** (`s` heads a loop containing `b`): do not recurse.
//!      Every phi in `s` contributes the value it receives from `b` to
//!      `LiveOut(b)`.
//!    - **Forward edge**: visit `s` first if needed, union `LiveIn(s)` into
//!      `LiveOut(b)`, then drop every value a phi in `s` receives from a
//!      predecessor other than `b`.
//! 2. `LiveIn(b)` starts as a copy of `LiveOut(b)`. A forward scan over
//!    the instructions kills each defined value, then adds each operand
//!    that is a parameter or is defined in another block.
//!
//! Constants are never tracked.
//!
//! # Loop latches
//!
//! Substituting the header's phi inputs at a latch is an approximation:
//! a value that stays live around a loop without feeding a header phi is
//! not carried back to the latch. [`solve_fixed_point`](crate::solve_fixed_point)
//! computes the classical answer for comparison.

use lanes_ir::{BlockId, Function, LoopForest, ValueId};

use crate::result::{BlockLiveness, LiveSet, LivenessResult};
use crate::stack::ensure_sufficient_stack;

/// Compute live-in/live-out sets for every block reachable from the entry.
///
/// `forest` must describe the loops of `func`; it decides which edges are
/// back edges. Blocks unreachable from the entry get no sets.
pub fn analyze(func: &Function, forest: &LoopForest) -> LivenessResult {
    tracing::debug!(
        function = %func.name,
        blocks = func.blocks.len(),
        loops = forest.len(),
        "computing liveness"
    );

    let mut walker = Walker {
        func,
        forest,
        visited: vec![false; func.blocks.len()],
        sets: vec![None; func.blocks.len()],
    };
    if func.contains_block(func.entry) {
        walker.visit(func.entry);
    }

    LivenessResult::new(func, walker.sets)
}

struct Walker<'a> {
    func: &'a Function,
    forest: &'a LoopForest,
    visited: Vec<bool>,
    sets: Vec<Option<BlockLiveness>>,
}

impl Walker<'_> {
    fn visit(&mut self, id: BlockId) {
        ensure_sufficient_stack(|| self.visit_block(id));
    }

    fn visit_block(&mut self, id: BlockId) {
        let func = self.func;
        let Some(block) = func.block(id) else {
            return;
        };
        self.visited[id.index()] = true;
        tracing::trace!(block = %id, name = %block.name, "visit");

        let mut live_out = LiveSet::new();
        for &succ in &block.succs {
            let Some(succ_block) = func.block(succ) else {
                continue;
            };

            if self.forest.is_back_edge(id, succ) {
                for phi in succ_block.phis() {
                    if let Some(value) = phi.incoming_for(id) {
                        if func.is_trackable(value) {
                            tracing::debug!(latch = %id, header = %succ, %value, "latch phi input");
                            live_out.insert(value);
                        }
                    }
                }
                continue;
            }

            if !self.visited[succ.index()] {
                self.visit(succ);
            }
            if let Some(succ_sets) = &self.sets[succ.index()] {
                live_out.extend(succ_sets.live_in.iter().copied());
            }
            for phi in succ_block.phis() {
                for incoming in phi.incoming() {
                    if incoming.block != id && live_out.remove(&incoming.value) {
                        tracing::debug!(
                            block = %id,
                            succ = %succ,
                            value = %incoming.value,
                            from = %incoming.block,
                            "phi input from other edge"
                        );
                    }
                }
            }
        }

        let mut live_in = live_out.clone();
        for instr in &block.instrs {
            if let Some(dst) = instr.dst {
                live_in.remove(&dst);
            }
            for operand in instr.operands() {
                if self.is_external(operand, id) {
                    live_in.insert(operand);
                }
            }
        }

        self.sets[id.index()] = Some(BlockLiveness { live_in, live_out });
    }

    /// Parameters, and instruction results defined outside `block`.
    fn is_external(&self, value: ValueId, block: BlockId) -> bool {
        if self.func.is_param(value) {
            return true;
        }
        matches!(self.func.defining_block(value), Some(def) if def != block)
    }
}
