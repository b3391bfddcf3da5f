//! Liveness query errors.

use lanes_diagnostic::ErrorCode;
use lanes_ir::BlockId;

/// Error returned by [`LivenessResult`](crate::LivenessResult) queries.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The block does not belong to the analyzed function.
    #[error("block {block} is not part of function `{function}`")]
    UnknownBlock { block: BlockId, function: String },
}

impl QueryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::UnknownBlock { .. } => ErrorCode::L5001,
        }
    }
}
