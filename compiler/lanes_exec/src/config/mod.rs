//! Dispatch configuration.

use std::env;

/// Environment variable selecting parallel dispatch and its worker count.
pub const THREADS_ENV: &str = "LANES_THREADS";

/// How work groups are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// One thread, every invocation finishes before the next starts.
    #[default]
    Sequential,
    /// Work groups spread over a scoped thread pool. `threads == 0` lets
    /// rayon pick the worker count.
    Parallel { threads: usize },
}

/// Which compiled entry point a launch uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchPath {
    /// One invocation per work item.
    #[default]
    Scalar,
    /// One invocation per lane group along `simd_dim`.
    Vectorized { simd_dim: usize },
}

/// Launch settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    pub mode: DispatchMode,
    pub path: DispatchPath,
    /// Stack size of parallel workers, in bytes.
    pub stack_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            mode: DispatchMode::Sequential,
            path: DispatchPath::Scalar,
            stack_size: 8 * 1024 * 1024,
        }
    }
}

impl DispatchConfig {
    /// Defaults, with the mode taken from `LANES_THREADS` if set.
    pub fn from_env() -> Self {
        Self::from_threads_var(env::var(THREADS_ENV).ok().as_deref())
    }

    /// `None` or empty keeps sequential dispatch; a number selects
    /// parallel dispatch with that many workers (`0` for rayon's default).
    pub fn from_threads_var(value: Option<&str>) -> Self {
        let mut config = Self::default();
        match value.map(str::trim) {
            None | Some("") => {}
            Some(raw) => match raw.parse::<usize>() {
                Ok(threads) => config.mode = DispatchMode::Parallel { threads },
                Err(err) => {
                    tracing::warn!(value = raw, "ignoring {THREADS_ENV}: {err}");
                }
            },
        }
        config
    }

    pub fn parallel(mut self, threads: usize) -> Self {
        self.mode = DispatchMode::Parallel { threads };
        self
    }

    pub fn vectorized(mut self, simd_dim: usize) -> Self {
        self.path = DispatchPath::Vectorized { simd_dim };
        self
    }

    /// Number of workers a launch will use.
    pub fn workers(&self) -> usize {
        match self.mode {
            DispatchMode::Sequential => 1,
            DispatchMode::Parallel { threads: 0 } => rayon::current_num_threads(),
            DispatchMode::Parallel { threads } => threads,
        }
    }
}
