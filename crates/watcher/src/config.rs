use alloy_primitives::Address;
use rollup_sync_providers::Retry;
use std::time::Duration;

/// The number of attempts made to fetch a block from the availability service.
pub const AVAILABILITY_FETCH_ATTEMPTS: usize = 10;

/// The delay between two attempts to fetch a block from the availability service.
pub const AVAILABILITY_FETCH_DELAY: Duration = Duration::from_secs(2);

/// The addresses of the contracts the watcher filters logs for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    /// The rollup contract.
    pub rollup: Address,
    /// The global exit root manager contract.
    pub global_exit_root_manager: Address,
    /// The `HotShot` contract emitting the new blocks events.
    pub hotshot: Address,
}

impl ContractAddresses {
    /// Returns the addresses as a list usable in a log filter.
    pub fn to_vec(&self) -> Vec<Address> {
        vec![self.rollup, self.global_exit_root_manager, self.hotshot]
    }
}

/// The configuration of the [`crate::RollupWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// The watched contracts.
    pub contracts: ContractAddresses,
    /// The `HotShot` block height at the L2 genesis. Batch numbers are offset by it.
    pub genesis_hotshot_block_number: u64,
    /// The retry policy for availability service requests.
    pub retry: Retry,
}

impl WatcherConfig {
    /// Returns a new [`WatcherConfig`] with the default retry policy.
    pub const fn new(contracts: ContractAddresses, genesis_hotshot_block_number: u64) -> Self {
        Self {
            contracts,
            genesis_hotshot_block_number,
            retry: Retry::fixed(AVAILABILITY_FETCH_ATTEMPTS, AVAILABILITY_FETCH_DELAY),
        }
    }

    /// Sets the retry policy for availability service requests.
    pub const fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::new(ContractAddresses::default(), 0)
    }
}
