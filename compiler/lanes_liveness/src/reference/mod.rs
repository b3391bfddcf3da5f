//! Classical iterative SSA liveness, used as a reference.
//!
//! Standard backward dataflow with fixed-point iteration in postorder:
//!
//! - `LiveOut(b) = ∪ over successors s of (PhiUses(b → s) ∪ (LiveIn(s) − PhiDefs(s)))`
//! - `LiveIn(b) = UpwardExposed(b) ∪ (LiveOut(b) − Defs(b))`
//!
//! Phi operands are uses on the incoming edge, not in the phi's block, so
//! they appear in the predecessor's `LiveOut` only. Needs no loop forest.
//!
//! This is slower than [`analyze`](crate::analyze) but exact for every CFG
//! shape, which makes it the oracle for the single-pass analyzer in tests
//! and in `lanes liveness --check`.

use lanes_ir::{graph, Block, BlockId, Function};

use crate::result::{BlockLiveness, LiveSet, LivenessResult};

/// Upward-exposed uses and definitions of one block.
struct GenKill {
    upward_exposed: LiveSet,
    defs: LiveSet,
}

fn gen_kill(func: &Function, block: &Block) -> GenKill {
    let mut upward_exposed = LiveSet::new();
    let mut defs = LiveSet::new();
    for instr in &block.instrs {
        if !instr.is_phi() {
            for operand in instr.operands() {
                if func.is_trackable(operand) && !defs.contains(&operand) {
                    upward_exposed.insert(operand);
                }
            }
        }
        if let Some(dst) = instr.dst {
            defs.insert(dst);
        }
    }
    GenKill {
        upward_exposed,
        defs,
    }
}

/// Values the phis of `succ` receive along the edge from `pred`.
fn phi_uses(func: &Function, pred: BlockId, succ: &Block) -> LiveSet {
    succ.phis()
        .filter_map(|phi| phi.incoming_for(pred))
        .filter(|&value| func.is_trackable(value))
        .collect()
}

/// Compute liveness by iterating to a fixed point.
///
/// Unreachable blocks get no sets, as with [`analyze`](crate::analyze).
pub fn solve_fixed_point(func: &Function) -> LivenessResult {
    let num_blocks = func.blocks.len();
    let gk: Vec<GenKill> = func.blocks.iter().map(|bb| gen_kill(func, bb)).collect();
    let postorder = graph::compute_postorder(func);

    let mut live_in: Vec<LiveSet> = vec![LiveSet::new(); num_blocks];
    let mut live_out: Vec<LiveSet> = vec![LiveSet::new(); num_blocks];

    let mut changed = true;
    let mut iterations = 0u32;
    while changed {
        changed = false;
        iterations += 1;

        for &id in &postorder {
            let block = &func.blocks[id.index()];

            let mut out = LiveSet::new();
            for &succ in &block.succs {
                let Some(succ_block) = func.block(succ) else {
                    continue;
                };
                out.extend(phi_uses(func, id, succ_block));
                let succ_phi_defs: LiveSet = succ_block.phis().filter_map(|phi| phi.dst).collect();
                out.extend(live_in[succ.index()].difference(&succ_phi_defs).copied());
            }

            let mut new_in = gk[id.index()].upward_exposed.clone();
            new_in.extend(out.difference(&gk[id.index()].defs).copied());

            if new_in != live_in[id.index()] || out != live_out[id.index()] {
                live_in[id.index()] = new_in;
                live_out[id.index()] = out;
                changed = true;
            }
        }
    }

    tracing::debug!(function = %func.name, iterations, "reference liveness converged");

    let reachable = graph::reachable_blocks(func);
    let sets = live_in
        .into_iter()
        .zip(live_out)
        .zip(reachable)
        .map(|((live_in, live_out), reachable)| {
            reachable.then_some(BlockLiveness { live_in, live_out })
        })
        .collect();
    LivenessResult::new(func, sets)
}
