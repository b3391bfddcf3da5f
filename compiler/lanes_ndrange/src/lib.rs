//! Iteration spaces for Lanes kernel launches.
//!
//! An [`IterationSpace`] is the validated 1-3 dimensional index domain of a
//! launch: global extents, work-group (local) extents and the derived group
//! counts. It decomposes linear work-item numbers into [`WorkItemIndex`]es,
//! and for vectorized kernels splits one dimension into lane groups
//! ([`LaneGroupSpace`], [`LaneGroupIndex`]).
//!
//! Everything here is plain data; dispatch lives in `lanes_exec`.

mod error;
mod lanes;
mod space;

pub use error::{AlignmentError, LaneGroupError, SizeArray, ValidationError};
pub use lanes::{LaneGroupIndex, LaneGroupSpace};
pub use space::{IterationSpace, WorkItemIndex, MAX_DIMS};
