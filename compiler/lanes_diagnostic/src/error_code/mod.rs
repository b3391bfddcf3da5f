//! Error codes for all engine diagnostics.
//!
//! Each error code is a unique identifier (e.g., `L1001`) with the first digit
//! indicating the subsystem that raised it. Used for `lanes explain` lookups.

use std::fmt;

/// Error codes for all engine diagnostics.
///
/// Format: L#### where first digit indicates the subsystem:
/// - L1xxx: Iteration-space validation errors
/// - L2xxx: Kernel argument errors
/// - L3xxx: SIMD alignment errors
/// - L4xxx: Kernel build errors
/// - L5xxx: Liveness query errors
/// - L6xxx: Memory region errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Validation Errors (L1xxx)
    /// Work dimension outside `1..=3`, or SIMD dimension outside the space
    L1001,
    /// Global size not divisible by local size (or zero local size)
    L1002,
    /// Global or local size array missing or of the wrong length
    L1003,
    /// Work-item or work-group count does not fit in `usize`
    L1004,

    // Argument Errors (L2xxx)
    /// Declared kernel parameter has no bound value at launch
    L2001,
    /// Argument index beyond the kernel's declared parameter count
    L2002,
    /// Local or constant address space used where it is not supported
    L2003,
    /// Bound value's address space differs from the kernel signature
    L2004,
    /// Non-local parameter bound without a value
    L2005,
    /// Local parameter bound with a value
    L2006,

    // Alignment Errors (L3xxx)
    /// SIMD dimension extent not divisible by the lane width
    L3001,

    // Build Errors (L4xxx)
    /// Kernel has no entry point for the requested dispatch path
    L4001,

    // Query Errors (L5xxx)
    /// Liveness queried for a block outside the analyzed function
    L5001,

    // Memory Errors (L6xxx)
    /// Memory region created with size zero
    L6001,
    /// Memory region access outside its bounds
    L6002,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// When adding a new variant: add it to the enum, `as_str()`,
    /// `description()`, and here.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::L1001,
        ErrorCode::L1002,
        ErrorCode::L1003,
        ErrorCode::L1004,
        ErrorCode::L2001,
        ErrorCode::L2002,
        ErrorCode::L2003,
        ErrorCode::L2004,
        ErrorCode::L2005,
        ErrorCode::L2006,
        ErrorCode::L3001,
        ErrorCode::L4001,
        ErrorCode::L5001,
        ErrorCode::L6001,
        ErrorCode::L6002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::L1001 => "L1001",
            ErrorCode::L1002 => "L1002",
            ErrorCode::L1003 => "L1003",
            ErrorCode::L1004 => "L1004",
            ErrorCode::L2001 => "L2001",
            ErrorCode::L2002 => "L2002",
            ErrorCode::L2003 => "L2003",
            ErrorCode::L2004 => "L2004",
            ErrorCode::L2005 => "L2005",
            ErrorCode::L2006 => "L2006",
            ErrorCode::L3001 => "L3001",
            ErrorCode::L4001 => "L4001",
            ErrorCode::L5001 => "L5001",
            ErrorCode::L6001 => "L6001",
            ErrorCode::L6002 => "L6002",
        }
    }

    /// One-line explanation, shown by `lanes explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::L1001 => "work dimension must be between 1 and 3",
            ErrorCode::L1002 => "global size must be a non-zero multiple of the local size",
            ErrorCode::L1003 => "global and local size arrays must have one entry per dimension",
            ErrorCode::L1004 => "total work-item count of the iteration space overflows",
            ErrorCode::L2001 => "every declared kernel parameter must be bound before launch",
            ErrorCode::L2002 => "argument index is beyond the kernel's parameter list",
            ErrorCode::L2003 => "local and constant address spaces are not supported",
            ErrorCode::L2004 => "bound value does not match the parameter's address space",
            ErrorCode::L2005 => "private and global parameters must be bound with a value",
            ErrorCode::L2006 => "local parameters are bound with a size only, never a value",
            ErrorCode::L3001 => "SIMD dimension extents must be divisible by the lane width",
            ErrorCode::L4001 => "kernel has no entry point for the requested dispatch path",
            ErrorCode::L5001 => "block does not belong to the analyzed function",
            ErrorCode::L6001 => "memory regions must have a non-zero size",
            ErrorCode::L6002 => "memory access is outside the region",
        }
    }

    /// Check if this is an iteration-space validation error (L1xxx range).
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::L1001 | ErrorCode::L1002 | ErrorCode::L1003 | ErrorCode::L1004
        )
    }

    /// Check if this is an argument error (L2xxx range).
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::L2001
                | ErrorCode::L2002
                | ErrorCode::L2003
                | ErrorCode::L2004
                | ErrorCode::L2005
                | ErrorCode::L2006
        )
    }

    /// Check if this is a SIMD alignment error (L3xxx range).
    pub fn is_alignment_error(&self) -> bool {
        matches!(self, ErrorCode::L3001)
    }

    /// Check if this is a kernel build error (L4xxx range).
    pub fn is_build_error(&self) -> bool {
        matches!(self, ErrorCode::L4001)
    }

    /// Check if this is a liveness query error (L5xxx range).
    pub fn is_query_error(&self) -> bool {
        matches!(self, ErrorCode::L5001)
    }

    /// Check if this is a memory region error (L6xxx range).
    pub fn is_memory_error(&self) -> bool {
        matches!(self, ErrorCode::L6001 | ErrorCode::L6002)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"L2001"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
