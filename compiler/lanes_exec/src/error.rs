//! Argument, build, memory and dispatch errors.

use std::fmt;

use lanes_diagnostic::ErrorCode;
use lanes_ndrange::{AlignmentError, LaneGroupError, ValidationError};

use crate::args::AddressSpace;

/// A kernel argument that cannot be bound or marshaled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    #[error("argument {index} has no bound value")]
    UnboundArgument { index: usize },

    #[error("argument index {index} out of range, kernel has {count} parameters")]
    ArgIndexOutOfRange { index: usize, count: usize },

    #[error("argument {index} is in the {space} address space, which is not supported")]
    AddressSpaceUnsupported { index: usize, space: AddressSpace },

    #[error("argument {index} is declared {expected} but was bound to a {found} value")]
    AddressSpaceMismatch {
        index: usize,
        expected: AddressSpace,
        found: AddressSpace,
    },

    #[error("argument {index} requires a value")]
    MissingArgValue { index: usize },

    #[error("argument {index} is local and takes a size only")]
    UnexpectedArgValue { index: usize },
}

impl ArgumentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ArgumentError::UnboundArgument { .. } => ErrorCode::L2001,
            ArgumentError::ArgIndexOutOfRange { .. } => ErrorCode::L2002,
            ArgumentError::AddressSpaceUnsupported { .. } => ErrorCode::L2003,
            ArgumentError::AddressSpaceMismatch { .. } => ErrorCode::L2004,
            ArgumentError::MissingArgValue { .. } => ErrorCode::L2005,
            ArgumentError::UnexpectedArgValue { .. } => ErrorCode::L2006,
        }
    }
}

/// Which compiled entry point a launch needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Scalar,
    Vector { width: usize },
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Scalar => f.write_str("scalar"),
            EntryKind::Vector { width } => write!(f, "{width}-lane vector"),
        }
    }
}

/// The kernel was not built with what the launch needs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("kernel `{kernel}` has no {kind} entry point")]
    EntryPointMissing { kernel: String, kind: EntryKind },
}

impl BuildError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BuildError::EntryPointMissing { .. } => ErrorCode::L4001,
        }
    }
}

/// Invalid memory-region creation or access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("invalid buffer size {size}")]
    InvalidBufferSize { size: usize },

    #[error("access of {len} bytes at offset {offset} is outside a buffer of {size} bytes")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },
}

impl MemoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MemoryError::InvalidBufferSize { .. } => ErrorCode::L6001,
            MemoryError::OutOfRange { .. } => ErrorCode::L6002,
        }
    }
}

/// Any reason a launch is refused. Nothing has run when this is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl From<LaneGroupError> for DispatchError {
    fn from(err: LaneGroupError) -> Self {
        match err {
            LaneGroupError::Validation(err) => DispatchError::Validation(err),
            LaneGroupError::Alignment(err) => DispatchError::Alignment(err),
        }
    }
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::Validation(err) => err.code(),
            DispatchError::Argument(err) => err.code(),
            DispatchError::Alignment(err) => err.code(),
            DispatchError::Build(err) => err.code(),
        }
    }
}
