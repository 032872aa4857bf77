///
/// Recoverable status codes.
///
/// Every blocking or allocating operation that can fail at runtime returns one
/// of these. Composite primitives pass them up unchanged: a failed notice wait
/// fails the board step, which fails the channel or entry operation.
///

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("resource busy")]
    Busy,

    #[error("synchronization failure: {reason}")]
    Error { reason: String },

    #[error("out of memory allocating {requested} slots")]
    OutOfMemory { requested: usize },

    #[error("deadline expired")]
    TimedOut,
}

impl SyncError {
    pub fn failed(reason: impl Into<String>) -> Self {
        SyncError::Error { reason: reason.into() }
    }

    /// True for the two statuses a caller may simply retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Busy | SyncError::TimedOut)
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
