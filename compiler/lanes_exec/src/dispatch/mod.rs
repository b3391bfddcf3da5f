//! Kernel dispatch over an iteration space.
//!
//! Every launch first checks, with nothing run yet: arguments marshal
//! (every parameter bound, supported address spaces), the needed entry
//! point exists, and for the vectorized path the SIMD dimension splits
//! into lane groups. Then:
//!
//! - **Scalar**: one invocation per work item, linear order 0..total
//!   decomposed row-major (last dimension fastest).
//! - **Vectorized**: one invocation per lane group, the SIMD dimension's
//!   extents divided by `W`.
//!
//! Sequential mode runs everything on the calling thread, each invocation
//! finishing before the next begins. Parallel mode hands whole work groups
//! to a scoped rayon pool; each worker keeps its own register set.

use std::time::{Duration, Instant};

use lanes_ndrange::{IterationSpace, LaneGroupSpace};
use rayon::prelude::*;

use crate::args::ArgumentBuffer;
use crate::config::{DispatchConfig, DispatchMode, DispatchPath};
use crate::error::{BuildError, DispatchError, EntryKind};
use crate::kernel::{Kernel, ScalarEntry, VectorEntry};
use crate::registers::{IndexRegisters, LaneRegisters};

/// What a finished launch did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSummary {
    /// Entry-point invocations (work items, or lane groups when vectorized).
    pub invocations: usize,
    /// Work items covered by one invocation.
    pub lane_width: usize,
    pub workers: usize,
    pub duration: Duration,
}

/// Validate the request, build the iteration space and launch.
pub fn launch_nd<const W: usize>(
    kernel: &Kernel<W>,
    dims: usize,
    global: Option<&[usize]>,
    local: Option<&[usize]>,
    config: &DispatchConfig,
) -> Result<LaunchSummary, DispatchError> {
    let space = IterationSpace::build(dims, global, local)?;
    launch(kernel, &space, config)
}

/// Launch `kernel` over `space` with its currently bound arguments.
pub fn launch<const W: usize>(
    kernel: &Kernel<W>,
    space: &IterationSpace,
    config: &DispatchConfig,
) -> Result<LaunchSummary, DispatchError> {
    let args = kernel.marshal()?;

    match config.path {
        DispatchPath::Scalar => {
            let entry = kernel
                .scalar_entry()
                .ok_or_else(|| BuildError::EntryPointMissing {
                    kernel: kernel.name().to_owned(),
                    kind: EntryKind::Scalar,
                })?;
            tracing::debug!(kernel = kernel.name(), items = space.total_items(), "scalar launch");
            Ok(dispatch_scalar(space, &args, entry, config))
        }
        DispatchPath::Vectorized { simd_dim } => {
            let entry = kernel
                .vector_entry()
                .ok_or_else(|| BuildError::EntryPointMissing {
                    kernel: kernel.name().to_owned(),
                    kind: EntryKind::Vector { width: W },
                })?;
            let lanes = space.lane_groups::<W>(simd_dim)?;
            tracing::debug!(
                kernel = kernel.name(),
                groups = lanes.total_groups(),
                width = W,
                simd_dim,
                "vectorized launch"
            );
            Ok(dispatch_vectorized(&lanes, &args, entry, config))
        }
    }
}

/// Invoke `entry` once per work item of `space`.
pub fn dispatch_scalar(
    space: &IterationSpace,
    args: &ArgumentBuffer,
    entry: &dyn ScalarEntry,
    config: &DispatchConfig,
) -> LaunchSummary {
    let start = Instant::now();

    let sequential = || {
        let mut regs = IndexRegisters::new(*space);
        for linear in 0..space.total_items() {
            let index = space.index_of(linear);
            tracing::trace!(global_id = ?index.global_id, "invoke");
            regs.set(index);
            entry.run(args, &regs);
        }
        space.total_items()
    };
    let parallel = || {
        (0..space.total_groups())
            .into_par_iter()
            .map_init(
                || IndexRegisters::new(*space),
                |regs, group| {
                    let mut count = 0;
                    for index in space.items_in_group(group) {
                        regs.set(index);
                        entry.run(args, regs);
                        count += 1;
                    }
                    count
                },
            )
            .sum::<usize>()
    };

    let (invocations, workers) = run_in_mode(config, parallel, sequential);
    summarize(invocations, 1, workers, start)
}

/// Invoke `entry` once per lane group of `lanes`.
pub fn dispatch_vectorized<const W: usize>(
    lanes: &LaneGroupSpace<W>,
    args: &ArgumentBuffer,
    entry: &dyn VectorEntry<W>,
    config: &DispatchConfig,
) -> LaunchSummary {
    let start = Instant::now();

    let sequential = || {
        let mut regs = LaneRegisters::new(lanes);
        let mut count = 0;
        for index in lanes.iter() {
            tracing::trace!(global_ids = ?index.lane_global_id, "invoke");
            regs.set(index);
            entry.run(args, &regs);
            count += 1;
        }
        count
    };
    let parallel = || {
        (0..lanes.total_work_groups())
            .into_par_iter()
            .map_init(
                || LaneRegisters::new(lanes),
                |regs, group| {
                    let mut count = 0;
                    for index in lanes.groups_in_work_group(group) {
                        regs.set(index);
                        entry.run(args, regs);
                        count += 1;
                    }
                    count
                },
            )
            .sum::<usize>()
    };

    let (invocations, workers) = run_in_mode(config, parallel, sequential);
    summarize(invocations, W, workers, start)
}

/// Run `parallel` inside a scoped pool when the config asks for it.
///
/// Falls back to `sequential` if the pool cannot be built. Returns the
/// result with the number of workers that produced it.
fn run_in_mode<R: Send>(
    config: &DispatchConfig,
    parallel: impl FnOnce() -> R + Send,
    sequential: impl FnOnce() -> R,
) -> (R, usize) {
    let DispatchMode::Parallel { threads } = config.mode else {
        return (sequential(), 1);
    };

    // Scoped so the workers are joined before the launch returns.
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .stack_size(config.stack_size)
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            (pool.install(parallel), pool.current_num_threads())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            (sequential(), 1)
        })
}

fn summarize(
    invocations: usize,
    lane_width: usize,
    workers: usize,
    start: Instant,
) -> LaunchSummary {
    let summary = LaunchSummary {
        invocations,
        lane_width,
        workers,
        duration: start.elapsed(),
    };
    tracing::debug!(
        invocations,
        workers = summary.workers,
        duration = ?summary.duration,
        "launch finished"
    );
    summary
}
