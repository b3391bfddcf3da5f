//! Lanes command-line driver.
//!
//! The `lanes` binary is a thin shell over this library:
//!
//! - [`commands`]: one function per subcommand, printing to stdout and
//!   exiting with status 1 on error.
//! - [`demos`]: built-in kernels with host-side verification, launched by
//!   `lanes run`.
//! - [`samples`]: built-in control-flow graphs analyzed by `lanes liveness`.

pub mod commands;
pub mod demos;
pub mod samples;
mod tracing_setup;

pub use tracing_setup::{init_tracing, LOG_ENV, LOG_TREE_ENV};
