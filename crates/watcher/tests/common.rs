#![allow(dead_code)]

use alloy_primitives::{address, bytes, Address, B256};
use alloy_sol_types::{SolCall, SolValue};
use rollup_sync_l1::abi::calls::getLastGlobalExitRootCall;
use rollup_sync_providers::{
    test_utils::{MockAvailability, MockChain},
    Retry, SequencerBlock,
};
use rollup_sync_watcher::{ContractAddresses, RollupWatcher, WatcherConfig};
use std::{sync::Arc, time::Duration};

pub const ROLLUP: Address = address!("0x610178dA211FEF7D417bC0e6FeD39F05609AD788");
pub const MANAGER: Address = address!("0x8A791620dd6260079BF849Dc5567aDC3F2FdC318");
pub const HOTSHOT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

pub const GENESIS_HOTSHOT: u64 = 100;

pub fn contracts() -> ContractAddresses {
    ContractAddresses { rollup: ROLLUP, global_exit_root_manager: MANAGER, hotshot: HOTSHOT }
}

pub fn watcher(
    chain: &MockChain,
    availability: &MockAvailability,
) -> RollupWatcher<MockChain, MockAvailability> {
    let config = WatcherConfig::new(contracts(), GENESIS_HOTSHOT)
        .with_retry(Retry::fixed(3, Duration::from_millis(1)));
    RollupWatcher::new(chain.clone(), availability.clone(), Arc::new(config))
}

/// Deploys the exit root manager at the provided block, serving the provided root.
pub fn deploy_manager(chain: &MockChain, at: u64, root: B256) {
    chain.set_code(MANAGER, at, bytes!("0x6080"));
    chain.set_call_result(MANAGER, getLastGlobalExitRootCall::SELECTOR, root.abi_encode().into());
}

pub fn sequencer_block(height: u64, l1_block: u64, timestamp: u64, txs: &str) -> SequencerBlock {
    SequencerBlock { timestamp, height, l1_block, transactions: txs.to_string() }
}
