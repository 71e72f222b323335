//! A deterministic executor deriving roots from the batch contents.

use crate::Genesis;
use alloy_primitives::{keccak256, Address, B256};

/// Returns the state root of the provided genesis.
pub fn genesis_root(genesis: &Genesis) -> B256 {
    let mut preimage = Vec::with_capacity(genesis.accounts.len() * 60);
    for account in &genesis.accounts {
        preimage.extend_from_slice(account.address.as_slice());
        preimage.extend_from_slice(&account.balance.to_be_bytes::<32>());
        preimage.extend_from_slice(&account.nonce.to_be_bytes());
    }
    keccak256(preimage)
}

/// Returns the state root after executing the batch on top of `previous`.
pub fn next_state_root(
    previous: B256,
    batch_number: u64,
    data: &[u8],
    global_exit_root: B256,
    timestamp: u64,
) -> B256 {
    keccak256(
        [
            previous.as_slice(),
            &batch_number.to_be_bytes(),
            keccak256(data).as_slice(),
            global_exit_root.as_slice(),
            &timestamp.to_be_bytes(),
        ]
        .concat(),
    )
}

/// Returns the accumulated input hash of the batch on top of `previous`.
pub fn accumulated_input_hash(
    previous: B256,
    data: &[u8],
    global_exit_root: B256,
    timestamp: u64,
    coinbase: Address,
) -> B256 {
    keccak256(
        [
            previous.as_slice(),
            keccak256(data).as_slice(),
            global_exit_root.as_slice(),
            &timestamp.to_be_bytes(),
            coinbase.as_slice(),
        ]
        .concat(),
    )
}

/// Returns the local exit root associated with the state root.
pub fn local_exit_root(state_root: B256) -> B256 {
    keccak256(state_root)
}

/// Returns the state root after a single transaction.
pub(crate) fn transaction_root(previous: B256, tx_hash: B256) -> B256 {
    keccak256([previous.as_slice(), tx_hash.as_slice()].concat())
}
