#![allow(dead_code)]

use alloy_primitives::{address, hex, Address, Bytes, Log, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use rollup_sync::{Synchronizer, SynchronizerConfig, SynchronizerError};
use rollup_sync_l1::abi::{
    calls::{getLastGlobalExitRootCall, lastBatchSequencedCall, trustedSequencerURLCall},
    logs::{NewBlocks, UpdateGlobalExitRoot, VerifyBatchesTrustedAggregator},
};
use rollup_sync_providers::{
    test_utils::{MockAvailability, MockBroadcast, MockChain},
    L1TransactionInfo, Retry, SequencerBlock,
};
use rollup_sync_state::{
    codec,
    test_utils::{
        executor::{genesis_root, next_state_root},
        transfer, InMemoryState, MockTxManager, StateData,
    },
    Genesis, GenesisAccount,
};
use rollup_sync_watcher::{ContractAddresses, RollupWatcher, WatcherConfig};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

pub const ROLLUP: Address = address!("0x610178dA211FEF7D417bC0e6FeD39F05609AD788");
pub const MANAGER: Address = address!("0x8A791620dd6260079BF849Dc5567aDC3F2FdC318");
pub const HOTSHOT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
pub const SEQUENCER: Address = address!("0x617b3a3528F9cDd6630fd3301B9c8911F7Bf063D");

pub const GEN_BLOCK: u64 = 100;
pub const GENESIS_HOTSHOT: u64 = 1_000;
pub const TRUSTED_URL: &str = "http://trusted-sequencer:8123";

/// A timestamp past the genesis block.
pub const L2_TIMESTAMP: u64 = 1_700_002_000;

pub type TestSynchronizer =
    Synchronizer<MockChain, MockAvailability, InMemoryState, MockTxManager, MockBroadcast>;

pub fn exit_root() -> B256 {
    B256::repeat_byte(0xee)
}

pub fn genesis() -> Genesis {
    let accounts = vec![GenesisAccount {
        address: Address::repeat_byte(0xa1),
        balance: U256::from(1_000_000_000_000_000_000u128),
        nonce: 0,
    }];
    let root = genesis_root(&Genesis { root: B256::ZERO, accounts: accounts.clone() });
    Genesis { root, accounts }
}

/// Returns the batch payload holding transfers with the provided nonces.
pub fn payload(nonces: &[u64]) -> Bytes {
    let txs: Vec<_> = nonces.iter().map(|n| transfer(*n)).collect();
    codec::encode_transactions(&txs)
}

/// Returns the state root after the provided batches, each given as its payload and timestamp,
/// all using the default exit root.
pub fn expected_root(batches: &[(Bytes, u64)]) -> B256 {
    batches.iter().enumerate().fold(genesis().root, |root, (i, (data, timestamp))| {
        next_state_root(root, i as u64 + 1, data, exit_root(), *timestamp)
    })
}

/// The mocks and the state a synchronizer runs against.
#[derive(Debug)]
pub struct Harness {
    pub chain: MockChain,
    pub availability: MockAvailability,
    pub broadcast: MockBroadcast,
    pub state: InMemoryState,
    pub tx_manager: MockTxManager,
    pub config: SynchronizerConfig,
}

impl Harness {
    /// Returns a harness over a base chain of blocks zero to `head`, with the contracts deployed
    /// at the genesis block.
    pub fn new(head: u64) -> Self {
        setup();
        let chain = MockChain::with_chain(head as usize + 1);
        chain.set_code(ROLLUP, GEN_BLOCK, Bytes::from_static(&[0x60, 0x80]));
        chain.set_code(MANAGER, GEN_BLOCK, Bytes::from_static(&[0x60, 0x80]));
        chain.set_call_result(
            MANAGER,
            getLastGlobalExitRootCall::SELECTOR,
            exit_root().abi_encode().into(),
        );
        chain.set_call_result(
            ROLLUP,
            trustedSequencerURLCall::SELECTOR,
            TRUSTED_URL.to_string().abi_encode().into(),
        );

        let config = SynchronizerConfig {
            sync_interval: Duration::from_millis(10),
            sync_chunk_size: 10,
            gen_block_number: GEN_BLOCK,
            is_trusted_sequencer: true,
            genesis: genesis(),
            ..Default::default()
        };

        let harness = Self {
            chain,
            availability: MockAvailability::default(),
            broadcast: MockBroadcast::default(),
            state: InMemoryState::default(),
            tx_manager: MockTxManager::default(),
            config,
        };
        harness.set_last_sequenced_batch(0);
        harness
    }

    pub fn synchronizer(&self) -> TestSynchronizer {
        self.synchronizer_with_state(self.state.clone())
    }

    pub fn synchronizer_with_state(&self, state: InMemoryState) -> TestSynchronizer {
        let contracts = ContractAddresses {
            rollup: ROLLUP,
            global_exit_root_manager: MANAGER,
            hotshot: HOTSHOT,
        };
        let config = WatcherConfig::new(contracts, GENESIS_HOTSHOT)
            .with_retry(Retry::fixed(3, Duration::from_millis(1)));
        let watcher =
            RollupWatcher::new(self.chain.clone(), self.availability.clone(), Arc::new(config));

        Synchronizer::new(
            watcher,
            state,
            self.tx_manager.clone(),
            self.broadcast.clone(),
            self.config.clone(),
        )
    }

    pub fn set_last_sequenced_batch(&self, batch_number: u64) {
        self.chain.set_call_result(
            ROLLUP,
            lastBatchSequencedCall::SELECTOR,
            batch_number.abi_encode().into(),
        );
    }

    /// Serves the L2 block of the batch on the availability service.
    pub fn push_l2_block(&self, batch_number: u64, l1_block: u64, timestamp: u64, data: &Bytes) {
        self.availability.push_block(SequencerBlock {
            timestamp,
            height: GENESIS_HOTSHOT + batch_number,
            l1_block,
            transactions: hex::encode_prefixed(data),
        });
    }

    /// Emits a new blocks event for `count` batches from `first_batch` at the block.
    pub fn push_new_blocks(&self, block: u64, first_batch: u64, count: u64) {
        let tx = L1TransactionInfo {
            hash: B256::with_last_byte(block as u8),
            from: SEQUENCER,
            nonce: block,
            input: Bytes::new(),
            block_number: Some(block),
        };
        self.chain.insert_transaction(tx.clone());

        let event = NewBlocks {
            firstBlockNumber: U256::from(GENESIS_HOTSHOT + first_batch),
            numBlocks: U256::from(count),
        };
        let log = Log { address: HOTSHOT, data: event.encode_log_data() };
        self.chain.push_log_with_tx(block, log, tx.hash);
    }

    pub fn push_exit_root(&self, block: u64, mainnet: u8, rollup: u8) {
        let event = UpdateGlobalExitRoot {
            mainnetExitRoot: B256::repeat_byte(mainnet),
            rollupExitRoot: B256::repeat_byte(rollup),
        };
        self.chain.push_log(block, Log { address: MANAGER, data: event.encode_log_data() });
    }

    pub fn push_verification(&self, block: u64, batch_number: u64, state_root: B256) {
        let event = VerifyBatchesTrustedAggregator {
            numBatch: batch_number,
            stateRoot: state_root,
            aggregator: Address::repeat_byte(0xaa),
        };
        self.chain.push_log(block, Log { address: ROLLUP, data: event.encode_log_data() });
    }

    /// Sets up the sequencing of batches 1 and 2 at block 120, an exit root update at block 130
    /// and the verification of both batches at block 140. Returns the payloads of the batches.
    pub fn push_scenario(&self) -> [(Bytes, u64); 2] {
        let batches = [(payload(&[0]), L2_TIMESTAMP), (payload(&[1, 2]), L2_TIMESTAMP + 1)];
        self.push_l2_block(1, 110, batches[0].1, &batches[0].0);
        self.push_l2_block(2, 111, batches[1].1, &batches[1].0);
        self.push_new_blocks(120, 1, 2);
        self.push_exit_root(130, 1, 2);
        self.push_verification(140, 2, expected_root(&batches));
        self.set_last_sequenced_batch(2);
        batches
    }
}

/// Installs a subscriber writing the logs filtered by `RUST_LOG` to the test output.
pub fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Spawns the synchronization.
pub fn spawn(synchronizer: TestSynchronizer) -> JoinHandle<Result<(), SynchronizerError>> {
    tokio::spawn(synchronizer.sync())
}

/// Waits for the committed state to satisfy the predicate.
pub async fn wait_until(
    state: &InMemoryState,
    predicate: impl Fn(&StateData) -> bool,
) -> eyre::Result<StateData> {
    let wait = async {
        loop {
            let data = state.snapshot().await;
            if predicate(&data) {
                return data;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(10), wait)
        .await
        .map_err(|_| eyre::eyre!("timed out waiting for the state"))
}

/// Returns the number of the last stored block.
pub fn last_block(data: &StateData) -> u64 {
    data.blocks.last_key_value().map(|(n, _)| *n).unwrap_or_default()
}
