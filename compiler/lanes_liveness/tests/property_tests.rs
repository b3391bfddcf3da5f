//! Property-based tests for the liveness analyzer.
//!
//! Generates random kernels in SSA form: a straight-line spine plus random
//! forward branches, with a phi at every merge. On acyclic kernels the
//! single-pass analyzer must agree with the iterative fixed-point solver.
//! Loop-bearing kernels add reducible back edges; there the single-pass
//! sets may only be smaller than the fixed point, and every latch must
//! carry the values its header phis receive from it.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use std::collections::BTreeSet;

use lanes_ir::graph::DominatorTree;
use lanes_ir::{BlockId, Function, FunctionBuilder, LoopForest, Opcode, ValueId};
use lanes_liveness::{analyze, solve_fixed_point, LiveSet, LivenessResult};
use proptest::prelude::*;

// -- CFG Generation --

/// Shape of a random acyclic CFG: block `i` always jumps to `i + 1`, and
/// may also branch forward to `extra[i]`.
#[derive(Clone, Debug)]
struct Shape {
    blocks: usize,
    extra: Vec<Option<usize>>,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (2usize..12).prop_flat_map(|blocks| {
        prop::collection::vec(any::<(bool, prop::sample::Index)>(), blocks).prop_map(
            move |picks| {
                let extra = picks
                    .into_iter()
                    .enumerate()
                    .map(|(i, (branch, target))| {
                        let first = i + 2;
                        (branch && first < blocks).then(|| first + target.index(blocks - first))
                    })
                    .collect();
                Shape { blocks, extra }
            },
        )
    })
}

fn block(i: usize) -> BlockId {
    BlockId::new(u32::try_from(i).unwrap())
}

/// Build the kernel for a shape.
fn build(shape: &Shape) -> Function {
    let n = shape.blocks;
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n - 1 {
        succs[i].push(i + 1);
        if let Some(target) = shape.extra[i] {
            succs[i].push(target);
        }
    }
    build_from_succs(&succs)
}

/// Build a kernel with the given successor lists.
///
/// Every block defines one value `d_i` from the entry value and a
/// parameter (or its own phi). Merge blocks take `d_p` from each
/// predecessor `p` through a phi, back edges included.
fn build_from_succs(succs: &[Vec<usize>]) -> Function {
    let n = succs.len();
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, targets) in succs.iter().enumerate() {
        for &t in targets {
            preds[t].push(i);
        }
    }

    let mut fb = FunctionBuilder::new("random");
    let p0 = fb.param("p0");
    let p1 = fb.param("p1");
    let e = fb.emit(Opcode::Add, &[p0, p1]);
    for _ in 1..n {
        fb.new_block("b");
    }

    let mut defs: Vec<ValueId> = Vec::with_capacity(n);
    let mut phis: Vec<Option<ValueId>> = Vec::with_capacity(n);
    for i in 0..n {
        fb.position_at(block(i));
        let phi = (preds[i].len() >= 2).then(|| fb.emit_phi());
        let lhs = phi.unwrap_or(e);
        let rhs = if i % 2 == 0 { p0 } else { p1 };
        let d = fb.emit(Opcode::Add, &[lhs, rhs]);
        defs.push(d);
        phis.push(phi);

        match succs[i].as_slice() {
            [] => fb.terminate_return(Some(d)),
            [next] => fb.terminate_jump(block(*next)),
            [then_block, else_block, ..] => {
                fb.terminate_branch(d, block(*then_block), block(*else_block));
            }
        }
    }

    // Back-edge inputs are defined after their phi, so incoming edges are
    // filled in once every block exists.
    for (i, phi) in phis.into_iter().enumerate() {
        if let Some(phi) = phi {
            for &p in &preds[i] {
                fb.add_incoming(phi, block(p), defs[p]);
            }
        }
    }
    fb.finish()
}

/// Shape of a random loop-bearing CFG: the spine of [`Shape`], and each
/// block may add one forward branch or one edge back to an earlier
/// non-entry block (itself included).
#[derive(Clone, Debug)]
struct LoopShape {
    blocks: usize,
    extra: Vec<Option<usize>>,
}

fn loop_shape_strategy() -> impl Strategy<Value = LoopShape> {
    (3usize..12).prop_flat_map(|blocks| {
        prop::collection::vec((0u8..3, any::<prop::sample::Index>()), blocks).prop_map(
            move |picks| {
                let extra = picks
                    .into_iter()
                    .enumerate()
                    .map(|(i, (kind, target))| match kind {
                        1 if i + 2 < blocks => Some(i + 2 + target.index(blocks - i - 2)),
                        2 if i >= 1 => Some(1 + target.index(i)),
                        _ => None,
                    })
                    .collect();
                LoopShape { blocks, extra }
            },
        )
    })
}

/// Build a reducible kernel for a loop shape.
///
/// An edge back to block `h` is kept only if `h` dominates its source, so
/// every remaining cycle is a natural loop. Dropping edges only adds
/// dominators, so the kept back edges stay valid.
fn build_loops(shape: &LoopShape) -> Function {
    let n = shape.blocks;
    let mut succs: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            let mut targets = Vec::new();
            if i + 1 < n {
                targets.push(i + 1);
            }
            targets.extend(shape.extra[i]);
            targets
        })
        .collect();

    let skeleton = build_from_succs(&succs);
    let dom = DominatorTree::build(&skeleton);
    for (i, targets) in succs.iter_mut().enumerate() {
        targets.retain(|&t| t > i || dom.dominates(block(t), block(i)));
    }
    build_from_succs(&succs)
}

fn sets(result: &LivenessResult, id: BlockId) -> (LiveSet, LiveSet) {
    let sets = result.block(id).unwrap().unwrap();
    (sets.live_in.clone(), sets.live_out.clone())
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// On acyclic CFGs the single-pass analyzer matches the fixed point.
    ///
    /// The analyzer counts a block's own phi inputs as uses in that block,
    /// the classical solver places them on the incoming edges, so live-in
    /// sets are compared with those inputs removed.
    #[test]
    fn prop_matches_fixed_point_without_loops(shape in shape_strategy()) {
        let func = build(&shape);
        let single_pass = analyze(&func, &LoopForest::empty());
        let exact = solve_fixed_point(&func);

        for bb in &func.blocks {
            let (in_a, out_a) = sets(&single_pass, bb.id);
            let (in_b, out_b) = sets(&exact, bb.id);
            prop_assert_eq!(&out_a, &out_b, "live-out of {}", bb.id);

            let phi_inputs: BTreeSet<ValueId> =
                bb.phis().flat_map(|phi| phi.operands()).collect();
            let in_a: LiveSet = in_a.difference(&phi_inputs).copied().collect();
            prop_assert_eq!(&in_a, &in_b, "live-in of {}", bb.id);
        }
    }

    /// Discovered loop forests are empty for these shapes.
    #[test]
    fn prop_forward_only_shapes_have_no_loops(shape in shape_strategy()) {
        let func = build(&shape);
        prop_assert!(LoopForest::discover(&func).is_empty());
    }

    /// Analysis is a pure function of its input.
    #[test]
    fn prop_analysis_is_deterministic(shape in shape_strategy()) {
        let func = build(&shape);
        let forest = LoopForest::discover(&func);
        let first = analyze(&func, &forest);
        let second = analyze(&func, &forest);
        prop_assert_eq!(first.dump(&func), second.dump(&func));
        prop_assert_eq!(first, second);
    }

    /// Live-out equals the union of successor live-ins minus phi inputs
    /// from other edges.
    #[test]
    fn prop_live_out_follows_successors(shape in shape_strategy()) {
        let func = build(&shape);
        let result = analyze(&func, &LoopForest::empty());

        for bb in &func.blocks {
            let mut expected = LiveSet::new();
            for &succ in &bb.succs {
                let (succ_in, _) = sets(&result, succ);
                expected.extend(succ_in);
                for phi in func.blocks[succ.index()].phis() {
                    for incoming in phi.incoming() {
                        if incoming.block != bb.id {
                            expected.remove(&incoming.value);
                        }
                    }
                }
            }
            let (_, out) = sets(&result, bb.id);
            prop_assert_eq!(out, expected, "live-out of {}", bb.id);
        }
    }

    /// Every latch keeps the values the header phis receive from it.
    #[test]
    fn prop_latches_carry_header_phi_inputs(shape in loop_shape_strategy()) {
        let func = build_loops(&shape);
        let forest = LoopForest::discover(&func);
        let result = analyze(&func, &forest);

        for bb in &func.blocks {
            let (_, out) = sets(&result, bb.id);
            for &succ in &bb.succs {
                if !forest.is_back_edge(bb.id, succ) {
                    continue;
                }
                for phi in func.blocks[succ.index()].phis() {
                    let input = phi.incoming_for(bb.id).unwrap();
                    prop_assert!(
                        out.contains(&input),
                        "latch {} lost {} for header {}",
                        bb.id,
                        func.value_name(input),
                        succ
                    );
                }
            }
        }
    }

    /// With loops the single-pass live-out never exceeds the fixed point.
    #[test]
    fn prop_live_out_within_fixed_point(shape in loop_shape_strategy()) {
        let func = build_loops(&shape);
        let single_pass = analyze(&func, &LoopForest::discover(&func));
        let exact = solve_fixed_point(&func);

        for bb in &func.blocks {
            let (_, ours) = sets(&single_pass, bb.id);
            let (_, theirs) = sets(&exact, bb.id);
            prop_assert!(
                ours.is_subset(&theirs),
                "live-out of {}: {:?} not within {:?}",
                bb.id,
                ours,
                theirs
            );
        }
    }

    /// Every kept back edge is one the loop forest recognizes.
    #[test]
    fn prop_back_edges_form_natural_loops(shape in loop_shape_strategy()) {
        let func = build_loops(&shape);
        let forest = LoopForest::discover(&func);

        for bb in &func.blocks {
            for &succ in &bb.succs {
                let retreating = succ.index() <= bb.id.index();
                prop_assert_eq!(forest.is_back_edge(bb.id, succ), retreating);
            }
        }
    }
}
