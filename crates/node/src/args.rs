use crate::constants;
use std::time::Duration;

use alloy_network::Ethereum;
use alloy_primitives::Address;
use alloy_provider::RootProvider;
use alloy_rpc_client::RpcClient;
use alloy_transport::layers::RetryBackoffLayer;
use rollup_sync::{Synchronizer, SynchronizerConfig};
use rollup_sync_providers::{HotShotClient, L1RpcGateway, Retry, RpcBroadcastConnector};
use rollup_sync_state::{Genesis, PendingTxManager, StateProvider};
use rollup_sync_watcher::{ContractAddresses, RollupWatcher, WatcherConfig};

/// The synchronizer built from the command line arguments.
pub type RpcSynchronizer<S, M> =
    Synchronizer<L1RpcGateway<RootProvider<Ethereum>>, HotShotClient, S, M, RpcBroadcastConnector>;

/// The arguments of the rollup synchronizer.
#[derive(Debug, Clone, clap::Args)]
pub struct RollupSyncArgs {
    /// The L1 provider arguments.
    #[command(flatten)]
    pub l1_provider_args: L1ProviderArgs,
    /// The synchronizer arguments.
    #[command(flatten)]
    pub synchronizer_args: SynchronizerArgs,
    /// The preconfirmation arguments.
    #[command(flatten)]
    pub preconfirmation_args: PreconfirmationArgs,
    /// The contract arguments.
    #[command(flatten)]
    pub contract_args: ContractArgs,
}

impl RollupSyncArgs {
    /// Returns the [`SynchronizerConfig`] for the provided genesis.
    pub fn synchronizer_config(&self, genesis: Genesis) -> SynchronizerConfig {
        let SynchronizerArgs {
            sync_interval_ms,
            sync_chunk_size,
            gen_block_number,
            ignore_gen_block_number_check,
            trusted_sequencer,
        } = self.synchronizer_args;

        SynchronizerConfig {
            sync_interval: Duration::from_millis(sync_interval_ms),
            preconfirmations_sync_interval: Duration::from_millis(
                self.preconfirmation_args.sync_interval_ms,
            ),
            sync_chunk_size,
            gen_block_number,
            ignore_gen_block_number_check,
            is_trusted_sequencer: trusted_sequencer,
            genesis,
        }
    }

    /// Returns the [`WatcherConfig`].
    pub fn watcher_config(&self) -> WatcherConfig {
        let PreconfirmationArgs { genesis_block_number, fetch_attempts, retry_delay_ms, .. } =
            self.preconfirmation_args;
        WatcherConfig::new(self.contract_args.addresses(), genesis_block_number)
            .with_retry(Retry::fixed(fetch_attempts, Duration::from_millis(retry_delay_ms)))
    }

    /// Consumes the arguments and builds a [`Synchronizer`] over the provided store.
    pub fn build<S, M>(self, state: S, tx_manager: M, genesis: Genesis) -> RpcSynchronizer<S, M>
    where
        S: StateProvider + Clone + 'static,
        M: PendingTxManager<S::Tx>,
    {
        tracing::info!(target: "rollup::node", "Building synchronizer with config:\n{:#?}", self);

        let L1ProviderArgs { url, compute_units_per_second, max_retries, initial_backoff } =
            self.l1_provider_args.clone();
        let client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(max_retries, initial_backoff, compute_units_per_second))
            .http(url);
        let gateway = L1RpcGateway::new(RootProvider::<Ethereum>::new(client));

        let availability = HotShotClient::new_http(self.preconfirmation_args.url.to_string());
        let watcher = RollupWatcher::new(gateway, availability, self.watcher_config().into());

        Synchronizer::new(
            watcher,
            state,
            tx_manager,
            RpcBroadcastConnector,
            self.synchronizer_config(genesis),
        )
    }
}

/// The arguments for the L1 provider.
#[derive(Debug, Clone, clap::Args)]
pub struct L1ProviderArgs {
    /// The URL for the L1 RPC.
    #[arg(long = "l1.url", id = "l1_url", value_name = "L1_URL", env = "ROLLUP_SYNC_L1_URL")]
    pub url: reqwest::Url,
    /// The compute units per second for the provider.
    #[arg(long = "l1.cups", id = "l1_compute_units_per_second", value_name = "L1_COMPUTE_UNITS_PER_SECOND", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "l1.max-retries", id = "l1_max_retries", value_name = "L1_MAX_RETRIES", default_value_t = constants::L1_PROVIDER_MAX_RETRIES)]
    pub max_retries: u32,
    /// The initial backoff for the provider.
    #[arg(long = "l1.initial-backoff", id = "l1_initial_backoff", value_name = "L1_INITIAL_BACKOFF", default_value_t = constants::L1_PROVIDER_INITIAL_BACKOFF)]
    pub initial_backoff: u64,
}

/// The arguments for the synchronizer.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct SynchronizerArgs {
    /// The interval between two synchronization iterations, in milliseconds.
    #[arg(long = "sync.interval", id = "sync_interval", value_name = "SYNC_INTERVAL_MS", default_value_t = constants::DEFAULT_SYNC_INTERVAL_MS)]
    pub sync_interval_ms: u64,
    /// The number of L1 blocks scanned per request.
    #[arg(
        long = "sync.chunk-size",
        id = "sync_chunk_size",
        value_name = "SYNC_CHUNK_SIZE",
        default_value_t = constants::DEFAULT_SYNC_CHUNK_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sync_chunk_size: u64,
    /// The L1 block the rollup contract was deployed at.
    #[arg(long = "sync.gen-block-number", id = "sync_gen_block_number", value_name = "GEN_BLOCK_NUMBER", env = "ROLLUP_SYNC_GEN_BLOCK_NUMBER")]
    pub gen_block_number: u64,
    /// Skips the verification of the genesis block number against the rollup contract.
    #[arg(long = "sync.ignore-gen-block-number-check")]
    pub ignore_gen_block_number_check: bool,
    /// Whether the node is the trusted sequencer, in which case the trusted state is not
    /// reconciled.
    #[arg(long = "sync.trusted-sequencer")]
    pub trusted_sequencer: bool,
}

/// The arguments for the `HotShot` availability service.
#[derive(Debug, Clone, clap::Args)]
pub struct PreconfirmationArgs {
    /// The URL of the `HotShot` query service.
    #[arg(long = "hotshot.url", id = "hotshot_url", value_name = "HOTSHOT_URL", env = "ROLLUP_SYNC_HOTSHOT_URL")]
    pub url: reqwest::Url,
    /// The `HotShot` block height at the L2 genesis.
    #[arg(long = "hotshot.genesis-block-number", id = "hotshot_genesis_block_number", value_name = "HOTSHOT_GENESIS_BLOCK_NUMBER", default_value_t = 0)]
    pub genesis_block_number: u64,
    /// The interval between two preconfirmation polls, in milliseconds. Zero disables the
    /// preconfirmations.
    #[arg(long = "hotshot.preconfirmations-interval", id = "hotshot_preconfirmations_interval", value_name = "PRECONFIRMATIONS_INTERVAL_MS", default_value_t = constants::DEFAULT_PRECONFIRMATIONS_INTERVAL_MS)]
    pub sync_interval_ms: u64,
    /// The number of attempts to fetch a block.
    #[arg(
        long = "hotshot.fetch-attempts",
        id = "hotshot_fetch_attempts",
        value_name = "FETCH_ATTEMPTS",
        default_value_t = constants::DEFAULT_AVAILABILITY_ATTEMPTS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub fetch_attempts: usize,
    /// The delay between two attempts to fetch a block, in milliseconds.
    #[arg(long = "hotshot.retry-delay", id = "hotshot_retry_delay", value_name = "RETRY_DELAY_MS", default_value_t = constants::DEFAULT_AVAILABILITY_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,
}

/// The addresses of the watched contracts.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct ContractArgs {
    /// The rollup contract.
    #[arg(long = "contracts.rollup", id = "contracts_rollup", value_name = "ROLLUP_ADDRESS")]
    pub rollup: Address,
    /// The global exit root manager contract.
    #[arg(long = "contracts.global-exit-root-manager", id = "contracts_global_exit_root_manager", value_name = "GLOBAL_EXIT_ROOT_MANAGER_ADDRESS")]
    pub global_exit_root_manager: Address,
    /// The `HotShot` contract.
    #[arg(long = "contracts.hotshot", id = "contracts_hotshot", value_name = "HOTSHOT_ADDRESS")]
    pub hotshot: Address,
}

impl ContractArgs {
    /// Returns the [`ContractAddresses`].
    pub const fn addresses(&self) -> ContractAddresses {
        ContractAddresses {
            rollup: self.rollup,
            global_exit_root_manager: self.global_exit_root_manager,
            hotshot: self.hotshot,
        }
    }
}
