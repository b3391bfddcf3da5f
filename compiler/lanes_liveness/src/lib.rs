//! Cross-block liveness for Lanes kernel CFGs.
//!
//! Given a [`Function`](lanes_ir::Function) and its precomputed
//! [`LoopForest`](lanes_ir::LoopForest), [`analyze`] computes which values
//! are live on entry to and exit from every reachable block. A vectorizing
//! transform uses these sets to decide which values must be carried across
//! block and loop boundaries.
//!
//! [`solve_fixed_point`] is the classical iterative solver over the same
//! IR. It is exact where the single-pass analyzer approximates (values
//! live around a loop without feeding a header phi).
//!
//! Both are pure functions of their input and may run concurrently for
//! distinct functions.

mod analyze;
mod error;
mod reference;
mod result;
mod stack;

pub use analyze::analyze;
pub use error::QueryError;
pub use reference::solve_fixed_point;
pub use result::{BlockLiveness, LiveSet, LivenessQuery, LivenessResult};
