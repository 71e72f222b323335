use rollup_sync_l1::RollupEventError;
use rollup_sync_providers::{AvailabilityError, L1ProviderError};

/// A [`Result`] that uses [`WatcherError`] as the error type.
pub(crate) type WatcherResult<T> = Result<T, WatcherError>;

/// An error that occurred with the rollup watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// An error with the L1 provider.
    #[error("l1 provider error: {0}")]
    L1Provider(#[from] L1ProviderError),
    /// An error with the availability service.
    #[error("availability service error: {0}")]
    Availability(#[from] AvailabilityError),
    /// A log with a known signature could not be decoded.
    #[error(transparent)]
    Decode(#[from] RollupEventError),
    /// An error related to the logs returned by the filter.
    #[error(transparent)]
    Logs(#[from] FilterLogError),
    /// The availability service returned a batch past the next expected one.
    #[error("received batch {batch_number} from the future, expected {expected}")]
    BatchGap {
        /// The received batch number.
        batch_number: u64,
        /// The expected batch number.
        expected: u64,
    },
    /// The availability service returned a payload that cannot be decoded.
    #[error("malformed payload for block {height}: {reason}")]
    MalformedPayload {
        /// The availability service height of the block.
        height: u64,
        /// The decoding failure.
        reason: String,
    },
    /// Sequenced batches were anchored to a lower block than the previous ones.
    #[error("l1 block number decreased from {previous} to {current}")]
    InconsistentBlockOrder {
        /// The previous block number.
        previous: u64,
        /// The current block number.
        current: u64,
    },
    /// A block from before the exit root manager deployment carries transactions.
    #[error("block {height} (l1 block {l1_block}) contains transactions from before the exit root manager deployment")]
    TransactionsBeforeDeployment {
        /// The availability service height of the block.
        height: u64,
        /// The anchor block of the block.
        l1_block: u64,
    },
}

impl WatcherError {
    /// Returns true if retrying the scan cannot resolve the error.
    pub const fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Self::BatchGap { .. } |
                Self::MalformedPayload { .. } |
                Self::InconsistentBlockOrder { .. } |
                Self::TransactionsBeforeDeployment { .. }
        )
    }
}

/// An error that occurred when filtering logs.
#[derive(Debug, thiserror::Error)]
pub enum FilterLogError {
    /// The log is missing a block number.
    #[error("missing block number for log")]
    MissingBlockNumber,
    /// The log is missing a block hash.
    #[error("missing block hash for log")]
    MissingBlockHash,
    /// The log is missing a transaction hash.
    #[error("missing transaction hash for log")]
    MissingTransactionHash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_classify_unrecoverable_errors() {
        assert!(WatcherError::BatchGap { batch_number: 5, expected: 3 }.is_unrecoverable());
        assert!(WatcherError::InconsistentBlockOrder { previous: 5, current: 3 }.is_unrecoverable());
        assert!(!WatcherError::L1Provider(L1ProviderError::NotFound).is_unrecoverable());
        assert!(!WatcherError::from(AvailabilityError::Unavailable(3)).is_unrecoverable());
        assert!(WatcherError::MalformedPayload { height: 3, reason: "odd length".into() }
            .is_unrecoverable());
    }
}
