use alloy_primitives::B256;
use rollup_sync_providers::{BroadcastError, L1ProviderError};
use rollup_sync_state::StateError;
use rollup_sync_watcher::WatcherError;

/// A [`Result`] that uses [`SynchronizerError`] as the error type.
pub(crate) type SynchronizerResult<T> = Result<T, SynchronizerError>;

/// An error that occurred in the synchronizer.
#[derive(Debug, thiserror::Error)]
pub enum SynchronizerError {
    /// An error with the L1 provider.
    #[error("l1 provider error: {0}")]
    L1Provider(#[from] L1ProviderError),
    /// An error with the rollup watcher.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),
    /// An error with the state.
    #[error("state error: {0}")]
    State(#[from] StateError),
    /// An error with the trusted sequencer broadcast service.
    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),
    /// The configured genesis block is not the deployment block of the rollup contract.
    #[error("genesis block {0} is not the deployment block of the rollup contract")]
    InvalidGenesisBlock(u64),
    /// The computed genesis root differs from the configured one.
    #[error("genesis root mismatch: expected {expected}, computed {computed}")]
    GenesisRootMismatch {
        /// The configured root.
        expected: B256,
        /// The computed root.
        computed: B256,
    },
    /// The live chain returned a block with another number than requested.
    #[error("requested block {expected}, got block {actual}")]
    BlockNumberMismatch {
        /// The requested block number.
        expected: u64,
        /// The returned block number.
        actual: u64,
    },
    /// No stored block matches the live chain.
    #[error("no stored block matches the live chain, reorg from block {block} cannot be resolved")]
    UnresolvableReorg {
        /// The last synchronized block at the time of the reorg.
        block: u64,
    },
    /// An order entry points outside the events of its block.
    #[error("invalid order entry in block {block}")]
    InvalidOrder {
        /// The block number.
        block: u64,
    },
    /// A batch of a sequence could not be executed.
    #[error("failed to execute batch {batch_number}: {source}")]
    Execution {
        /// The batch number.
        batch_number: u64,
        /// The execution error.
        #[source]
        source: StateError,
    },
    /// The state root of a verified batch differs from the local one.
    #[error("verified batch {batch_number} state root mismatch: local {local}, verified {verified}")]
    VerifiedRootMismatch {
        /// The batch number.
        batch_number: u64,
        /// The local state root.
        local: B256,
        /// The state root of the verification.
        verified: B256,
    },
    /// A transaction could not be rolled back after a failure.
    #[error("failed to roll back after {cause}: {rollback}")]
    Rollback {
        /// The failure which triggered the rollback.
        cause: Box<SynchronizerError>,
        /// The rollback error.
        rollback: StateError,
    },
    /// The preconfirmation task panicked or was aborted.
    #[error("preconfirmation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SynchronizerError {
    /// Returns true if the error requires an operator intervention. The synchronizer stops on
    /// fatal errors and retries on any other.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Watcher(err) => err.is_unrecoverable(),
            Self::InvalidGenesisBlock(_) |
            Self::GenesisRootMismatch { .. } |
            Self::UnresolvableReorg { .. } |
            Self::Execution { .. } |
            Self::VerifiedRootMismatch { .. } |
            Self::Rollback { .. } |
            Self::Task(_) => true,
            _ => false,
        }
    }
}
