//! Subcommand implementations.
//!
//! Each `*_command` function prints its result and exits with status 1 on
//! error. The report builders next to them return strings so they can be
//! tested without a process.

mod explain;
mod list;
mod liveness;
mod run;

pub use explain::explain_error;
pub use list::list_all;
pub use liveness::{liveness_command, liveness_report};
pub use run::{parse_run_options, run_command, RunOptions};
