use alloy_eips::eip2718::Eip2718Error;

/// A [`Result`] that uses [`StateError`] as the error type.
pub type StateResult<T> = Result<T, StateError>;

/// The error type for state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The requested record was not found.
    #[error("not found")]
    NotFound,
    /// The state holds no synchronized data yet.
    #[error("state not synchronized")]
    StateNotSynchronized,
    /// A batch payload holds an undecodable transaction.
    #[error("invalid transaction in batch payload: {0}")]
    InvalidTransaction(#[from] Eip2718Error),
    /// The batch could not be executed.
    #[error("batch {batch_number} execution failed: {reason}")]
    Execution {
        /// The executed batch.
        batch_number: u64,
        /// The failure reason.
        reason: String,
    },
    /// The underlying storage failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StateError {
    /// Returns true if the error signals an absent record, either because it does not exist or
    /// because the state is empty.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::StateNotSynchronized)
    }
}
