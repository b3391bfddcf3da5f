//! The `run` command: launch a built-in kernel and verify its output.

use lanes_exec::{DispatchConfig, DispatchMode, DispatchPath};

use crate::demos::{run_demo, Demo, DemoOutcome};

/// Options for `lanes run`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub kernel: Option<String>,
    pub config: DispatchConfig,
    pub lane_width: usize,
    /// Problem size; the kernel's default when `None`.
    pub size: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            kernel: None,
            config: DispatchConfig::default(),
            lane_width: 4,
            size: None,
        }
    }
}

/// Parse the arguments after `run`. Flags override `base`, which usually
/// comes from [`DispatchConfig::from_env`].
pub fn parse_run_options(args: &[String], base: DispatchConfig) -> Result<RunOptions, String> {
    let mut options = RunOptions {
        config: base,
        ..RunOptions::default()
    };

    for arg in args {
        if arg == "--parallel" || arg == "-p" {
            if options.config.mode == DispatchMode::Sequential {
                options.config.mode = DispatchMode::Parallel { threads: 0 };
            }
        } else if let Some(value) = arg.strip_prefix("--threads=") {
            options.config.mode = DispatchMode::Parallel {
                threads: parse_number("--threads", value)?,
            };
        } else if let Some(value) = arg.strip_prefix("--simd-dim=") {
            options.config.path = DispatchPath::Vectorized {
                simd_dim: parse_number("--simd-dim", value)?,
            };
        } else if let Some(value) = arg.strip_prefix("--lane-width=") {
            options.lane_width = parse_number("--lane-width", value)?;
        } else if let Some(value) = arg.strip_prefix("--size=") {
            options.size = Some(parse_number("--size", value)?);
        } else if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'"));
        } else if options.kernel.is_none() {
            options.kernel = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument '{arg}'"));
        }
    }
    Ok(options)
}

fn parse_number(flag: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got '{value}'"))
}

/// Launch the kernel named in `options` and print a summary.
pub fn run_command(options: &RunOptions) {
    let Some(name) = options.kernel.as_deref() else {
        eprintln!("error: missing kernel name");
        eprintln!("Usage: lanes run <kernel> [options]");
        std::process::exit(1);
    };
    let Some(demo) = Demo::parse(name) else {
        eprintln!("error: unknown kernel '{name}'");
        eprintln!("Run `lanes list` to see the built-in kernels.");
        std::process::exit(1);
    };

    let size = options.size.unwrap_or_else(|| demo.default_size());
    match run_demo(demo, size, options.lane_width, &options.config) {
        Ok(outcome) => println!("{}", render_outcome(&outcome, &options.config)),
        Err(err) => {
            match err.code() {
                Some(code) => eprintln!("error[{code}]: {err}"),
                None => eprintln!("error: {err}"),
            }
            std::process::exit(1);
        }
    }
}

pub(crate) fn render_outcome(outcome: &DemoOutcome, config: &DispatchConfig) -> String {
    let path = match config.path {
        DispatchPath::Scalar => "scalar".to_owned(),
        DispatchPath::Vectorized { simd_dim } => {
            format!("{}-lane vectorized along dim {simd_dim}", outcome.summary.lane_width)
        }
    };
    let mode = match config.mode {
        DispatchMode::Sequential => "sequential".to_owned(),
        DispatchMode::Parallel { .. } => format!("parallel, {} workers", outcome.summary.workers),
    };
    format!(
        "kernel `{}` over {:?} (local {:?}), {path}, {mode}\n\
         {} invocations in {:?}\n\
         verified {} results",
        outcome.demo,
        outcome.global,
        outcome.local,
        outcome.summary.invocations,
        outcome.summary.duration,
        outcome.verified
    )
}
