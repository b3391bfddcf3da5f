//! Error codes for the Lanes engine.
//!
//! Every error surfaced by the analysis and execution crates carries an
//! [`ErrorCode`] so callers (and the `lanes explain` command) can look a
//! failure up without matching on crate-specific enums.
//!
//! ```text
//! match launch(&kernel, &space, &config) {
//!     Err(err) => eprintln!("error[{}]: {err}", err.code()),
//!     Ok(summary) => { ... }
//! }
//! ```

mod error_code;

pub use error_code::ErrorCode;
