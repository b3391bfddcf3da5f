//! Iteration-space validation and lane alignment errors.

use std::fmt;

use lanes_diagnostic::ErrorCode;

/// Which size array of a launch request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeArray {
    Global,
    Local,
}

impl SizeArray {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeArray::Global => "global",
            SizeArray::Local => "local",
        }
    }
}

impl fmt::Display for SizeArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A launch request that does not describe a valid iteration space.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Dimensionality outside `1..=3`, or a dimension index beyond it.
    #[error("work dimension {dim} is out of range (maximum {max})")]
    InvalidWorkDimension { dim: usize, max: usize },

    /// A local extent of zero, a global extent of zero, or a global extent
    /// that is not a multiple of the local one.
    #[error("invalid work-group size in dimension {dim}: global {global} is not a positive multiple of local {local}")]
    InvalidWorkGroupSize {
        dim: usize,
        global: usize,
        local: usize,
    },

    /// A size array is absent or has the wrong number of entries.
    /// `found` is `None` when the array is absent.
    #[error("{which} size array is missing or does not have {expected} entries")]
    MissingSizeArray {
        which: SizeArray,
        expected: usize,
        found: Option<usize>,
    },

    /// The product of the global extents does not fit in `usize`.
    #[error("iteration space {global:?} has more work items than fit in usize")]
    TooManyWorkItems { global: Vec<usize> },
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidWorkDimension { .. } => ErrorCode::L1001,
            ValidationError::InvalidWorkGroupSize { .. } => ErrorCode::L1002,
            ValidationError::MissingSizeArray { .. } => ErrorCode::L1003,
            ValidationError::TooManyWorkItems { .. } => ErrorCode::L1004,
        }
    }
}

/// The SIMD dimension cannot be split into lane groups.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AlignmentError {
    #[error("dimension {dim} (global {global}, local {local}) is not divisible by lane width {width}")]
    SimdDimensionNotDivisible {
        dim: usize,
        global: usize,
        local: usize,
        width: usize,
    },
}

impl AlignmentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AlignmentError::SimdDimensionNotDivisible { .. } => ErrorCode::L3001,
        }
    }
}

/// Failure to derive a lane-group space.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LaneGroupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

impl LaneGroupError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LaneGroupError::Validation(err) => err.code(),
            LaneGroupError::Alignment(err) => err.code(),
        }
    }
}
