//! Built-in demo kernels.
//!
//! Each demo binds its own buffers, launches through the regular dispatch
//! path and checks the output against the same computation done on the
//! host. Both demos provide scalar and vectorized entry points, so any
//! [`DispatchConfig`] exercises real kernel code.

use std::fmt;
use std::mem::size_of;

use lanes_diagnostic::ErrorCode;
use lanes_exec::{
    launch_nd, ArgValue, ArgumentBuffer, ArgumentError, BufferHandle, DispatchConfig,
    DispatchError, Kernel, KernelSignature, LaneRegisters, LaunchSummary, MemoryError, ParamDesc,
};

/// A built-in kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demo {
    /// `out[i] = in[i] * in[i]` for `i < count`, 1-D.
    Square,
    /// `out[j + i*n] = in[i] + in[j]`, 2-D over `[n, n]`.
    Pairwise,
}

impl Demo {
    pub const ALL: &'static [Demo] = &[Demo::Square, Demo::Pairwise];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Square => "square",
            Demo::Pairwise => "pairwise",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Demo::Square => "out[i] = in[i]^2 over a 1-D range",
            Demo::Pairwise => "out[j + i*n] = in[i] + in[j] over an n x n range",
        }
    }

    pub fn parse(name: &str) -> Option<Demo> {
        Self::ALL.iter().copied().find(|demo| demo.name() == name)
    }

    /// Problem size used when none is given.
    pub fn default_size(self) -> usize {
        match self {
            Demo::Square => 1024,
            Demo::Pairwise => 16,
        }
    }

    pub fn dims(self) -> usize {
        match self {
            Demo::Square => 1,
            Demo::Pairwise => 2,
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a demo did not produce verified output.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("lane width {0} is not supported (use 4 or 8)")]
    UnsupportedLaneWidth(usize),
    #[error("{mismatches} of {total} results differ from the host computation")]
    Mismatch { mismatches: usize, total: usize },
}

impl DemoError {
    /// The engine error code, for failures the engine reported.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            DemoError::Dispatch(err) => Some(err.code()),
            DemoError::Argument(err) => Some(err.code()),
            DemoError::Memory(err) => Some(err.code()),
            DemoError::UnsupportedLaneWidth(_) | DemoError::Mismatch { .. } => None,
        }
    }
}

/// A verified demo launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoOutcome {
    pub demo: Demo,
    pub global: Vec<usize>,
    pub local: Vec<usize>,
    pub summary: LaunchSummary,
    /// Output elements compared against the host computation.
    pub verified: usize,
}

/// Launch `demo` at problem size `size` with lane width `lane_width`.
pub fn run_demo(
    demo: Demo,
    size: usize,
    lane_width: usize,
    config: &DispatchConfig,
) -> Result<DemoOutcome, DemoError> {
    match lane_width {
        4 => run_with_width::<4>(demo, size, config),
        8 => run_with_width::<8>(demo, size, config),
        other => Err(DemoError::UnsupportedLaneWidth(other)),
    }
}

fn run_with_width<const W: usize>(
    demo: Demo,
    size: usize,
    config: &DispatchConfig,
) -> Result<DemoOutcome, DemoError> {
    let local_extent = preferred_local(size);
    let global = vec![size; demo.dims()];
    let local = vec![local_extent; demo.dims()];
    let data = input_data(size);
    let input = BufferHandle::from_scalars(&data)?;

    let (summary, output, expected) = match demo {
        Demo::Square => {
            let output = BufferHandle::zeroed::<f32>(size)?;
            let kernel = square_kernel::<W>(&input, &output, size)?;
            let summary = launch_nd(
                &kernel,
                1,
                Some(global.as_slice()),
                Some(local.as_slice()),
                config,
            )?;
            let expected: Vec<f32> = data.iter().map(|x| x * x).collect();
            (summary, output, expected)
        }
        Demo::Pairwise => {
            let output = BufferHandle::zeroed::<f32>(size * size)?;
            let kernel = pairwise_kernel::<W>(&input, &output, size)?;
            let summary = launch_nd(
                &kernel,
                2,
                Some(global.as_slice()),
                Some(local.as_slice()),
                config,
            )?;
            let expected: Vec<f32> = data
                .iter()
                .flat_map(|&left| data.iter().map(move |&right| left + right))
                .collect();
            (summary, output, expected)
        }
    };

    let actual: Vec<f32> = output.to_scalars();
    let mismatches = actual
        .iter()
        .zip(&expected)
        .filter(|(a, e)| a.to_bits() != e.to_bits())
        .count();
    if mismatches > 0 {
        return Err(DemoError::Mismatch {
            mismatches,
            total: expected.len(),
        });
    }

    Ok(DemoOutcome {
        demo,
        global,
        local,
        summary,
        verified: expected.len(),
    })
}

/// Largest of 16, 8, 4, 2, 1 dividing `size`.
fn preferred_local(size: usize) -> usize {
    [16, 8, 4, 2]
        .into_iter()
        .find(|local| size % local == 0)
        .unwrap_or(1)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "demo inputs are small integers"
)]
fn input_data(size: usize) -> Vec<f32> {
    (0..size).map(|i| (i % 97) as f32 * 0.5 + 0.25).collect()
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "demo sizes fit in u32"
)]
fn bind_buffers<const W: usize>(
    kernel: &mut Kernel<W>,
    input: &BufferHandle,
    output: &BufferHandle,
    size: usize,
) -> Result<(), ArgumentError> {
    kernel.set_arg(0, size_of::<usize>(), Some(ArgValue::Global(input.clone())))?;
    kernel.set_arg(1, size_of::<usize>(), Some(ArgValue::Global(output.clone())))?;
    kernel.set_arg(2, 4, Some(ArgValue::scalar(size as u32)))
}

fn signature(name: &str) -> KernelSignature {
    KernelSignature::new(
        name,
        [
            ParamDesc::global(),
            ParamDesc::global(),
            ParamDesc::private(4),
        ],
    )
}

/// Input, output and count parameters, as the demos declare them.
fn params(args: &ArgumentBuffer) -> Option<(&BufferHandle, &BufferHandle, usize)> {
    let count: u32 = args.arg(2)?;
    Some((args.buffer(0)?, args.buffer(1)?, count as usize))
}

fn square_kernel<const W: usize>(
    input: &BufferHandle,
    output: &BufferHandle,
    size: usize,
) -> Result<Kernel<W>, ArgumentError> {
    let mut kernel = Kernel::new(signature("square"))
        .with_scalar(|args, regs| square_item(args, regs.global_id(0)))
        .with_vector(|args, regs: &LaneRegisters<W>| {
            for &i in regs.global_ids() {
                square_item(args, i);
            }
        });
    bind_buffers(&mut kernel, input, output, size)?;
    Ok(kernel)
}

fn square_item(args: &ArgumentBuffer, i: usize) {
    let Some((input, output, count)) = params(args) else {
        tracing::error!("square: arguments not bound as declared");
        return;
    };
    if i >= count {
        return;
    }
    if let Err(err) = input.load::<f32>(i).and_then(|x| output.store(i, x * x)) {
        tracing::error!(item = i, "square: {err}");
    }
}

fn pairwise_kernel<const W: usize>(
    input: &BufferHandle,
    output: &BufferHandle,
    size: usize,
) -> Result<Kernel<W>, ArgumentError> {
    let mut kernel = Kernel::new(signature("pairwise"))
        .with_scalar(|args, regs| pairwise_item(args, regs.global_id(0), regs.global_id(1)))
        .with_vector(|args, regs: &LaneRegisters<W>| {
            // Only the SIMD dimension's ids vary across lanes.
            for lane in 0..W {
                if let Some(index) = regs.lane(lane) {
                    pairwise_item(args, index.global_id[0], index.global_id[1]);
                }
            }
        });
    bind_buffers(&mut kernel, input, output, size)?;
    Ok(kernel)
}

fn pairwise_item(args: &ArgumentBuffer, i: usize, j: usize) {
    let Some((input, output, n)) = params(args) else {
        tracing::error!("pairwise: arguments not bound as declared");
        return;
    };
    let result = input.load::<f32>(i).and_then(|left| {
        let right = input.load::<f32>(j)?;
        output.store(j + i * n, left + right)
    });
    if let Err(err) = result {
        tracing::error!(i, j, "pairwise: {err}");
    }
}
