use rollup_sync_state::Genesis;
use std::time::Duration;

/// The default interval between two synchronization iterations.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(1);

/// The default number of base chain blocks scanned per request.
pub const DEFAULT_SYNC_CHUNK_SIZE: u64 = 100;

/// The configuration of the [`crate::Synchronizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynchronizerConfig {
    /// The interval between two synchronization iterations.
    pub sync_interval: Duration,
    /// The interval between two preconfirmation polls. Zero disables the preconfirmations.
    pub preconfirmations_sync_interval: Duration,
    /// The number of base chain blocks scanned per request.
    pub sync_chunk_size: u64,
    /// The base chain block the rollup contract was deployed at.
    pub gen_block_number: u64,
    /// Skips the verification of the genesis block number against the deployed contract.
    pub ignore_gen_block_number_check: bool,
    /// Whether the node is the trusted sequencer, in which case it does not reconcile the trusted
    /// state.
    pub is_trusted_sequencer: bool,
    /// The L2 genesis.
    pub genesis: Genesis,
}

impl SynchronizerConfig {
    /// Returns true if the preconfirmations are enabled.
    pub const fn use_preconfirmations(&self) -> bool {
        !self.preconfirmations_sync_interval.is_zero()
    }
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            sync_interval: DEFAULT_SYNC_INTERVAL,
            preconfirmations_sync_interval: Duration::ZERO,
            sync_chunk_size: DEFAULT_SYNC_CHUNK_SIZE,
            gen_block_number: 0,
            ignore_gen_block_number_check: false,
            is_trusted_sequencer: false,
            genesis: Genesis::default(),
        }
    }
}
