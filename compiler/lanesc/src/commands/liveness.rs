//! The `liveness` command: analyze a built-in CFG and print its sets.

use std::fmt::Write as _;

use lanes_ir::{Block, Function, LoopForest};
use lanes_liveness::{analyze, solve_fixed_point, BlockLiveness, LiveSet, LivenessResult};

use crate::samples::Sample;

/// Print the liveness report for the sample named `name`.
pub fn liveness_command(name: &str, check: bool) {
    let Some(sample) = Sample::parse(name) else {
        eprintln!("error: unknown CFG sample '{name}'");
        eprintln!("Run `lanes list` to see the available samples.");
        std::process::exit(1);
    };
    println!("{}", liveness_report(sample, check));
}

/// The function, its loops and its live sets as text.
///
/// With `check`, the single-pass result is compared with the reference
/// solver and every block where they disagree is listed. Live-in sets are
/// compared without the block's own phi inputs, which the single-pass
/// analyzer counts as uses in the phi's block and the reference counts on
/// the incoming edge.
pub fn liveness_report(sample: Sample, check: bool) -> String {
    let func = sample.build();
    let forest = LoopForest::discover(&func);
    let result = analyze(&func, &forest);

    let mut out = String::new();
    let _ = writeln!(out, "{func}");
    let _ = writeln!(out);
    for lp in forest.iter() {
        let blocks: Vec<String> = lp.blocks.iter().map(ToString::to_string).collect();
        let _ = writeln!(
            out,
            "loop at {} (depth {}): {}",
            lp.header,
            lp.depth,
            blocks.join(" ")
        );
    }
    out.push_str(&result.dump(&func));

    if check {
        out.push_str("\n\n");
        out.push_str(&check_against_reference(&func, &result));
    }
    out
}

fn check_against_reference(func: &Function, result: &LivenessResult) -> String {
    let reference = solve_fixed_point(func);
    let mut diffs = Vec::new();

    for (id, ours) in result.iter() {
        let Ok(Some(theirs)) = reference.block(id) else {
            diffs.push(format!("  {id}: reference solver has no sets"));
            continue;
        };
        let Some(block) = func.block(id) else {
            continue;
        };
        if ours.live_out != theirs.live_out {
            diffs.push(format!(
                "  {id} out: analyzer {} reference {}",
                render(func, &ours.live_out),
                render(func, &theirs.live_out)
            ));
        }
        let (in_ours, in_theirs) = live_in_without_phi_inputs(block, ours, theirs);
        if in_ours != in_theirs {
            diffs.push(format!(
                "  {id} in: analyzer {} reference {}",
                render(func, &in_ours),
                render(func, &in_theirs)
            ));
        }
    }

    if diffs.is_empty() {
        format!(
            "reference solver agrees on all {} reachable blocks",
            result.iter().count()
        )
    } else {
        format!("reference solver differs:\n{}", diffs.join("\n"))
    }
}

fn live_in_without_phi_inputs(
    block: &Block,
    ours: &BlockLiveness,
    theirs: &BlockLiveness,
) -> (LiveSet, LiveSet) {
    let phi_inputs: LiveSet = block.phis().flat_map(|phi| phi.operands()).collect();
    (
        ours.live_in.difference(&phi_inputs).copied().collect(),
        theirs.live_in.difference(&phi_inputs).copied().collect(),
    )
}

fn render(func: &Function, set: &LiveSet) -> String {
    let names: Vec<String> = set.iter().map(|&v| func.value_name(v)).collect();
    format!("{{{}}}", names.join(", "))
}
