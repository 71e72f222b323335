use alloy_primitives::{Address, Bytes, B256, U256};

/// An L2 batch as stored in the state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Batch {
    /// The batch number.
    pub batch_number: u64,
    /// The address receiving the batch fees.
    pub coinbase: Address,
    /// The encoded transactions of the batch.
    pub batch_l2_data: Bytes,
    /// The state root after the batch, zero while the batch is open.
    pub state_root: B256,
    /// The local exit root after the batch.
    pub local_exit_root: B256,
    /// The accumulated input hash of the batch.
    pub acc_input_hash: B256,
    /// The global exit root used by the batch.
    pub global_exit_root: B256,
    /// The batch timestamp.
    pub timestamp: u64,
    /// Whether the batch is closed.
    pub closed: bool,
}

/// A batch made visible on the base chain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VirtualBatch {
    /// The batch number.
    pub batch_number: u64,
    /// The sequencing transaction.
    pub tx_hash: B256,
    /// The address receiving the batch fees.
    pub coinbase: Address,
    /// The sequencer of the batch.
    pub sequencer: Address,
    /// The base chain block the batch is attached to.
    pub block_number: u64,
}

/// The context a batch is opened with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingContext {
    /// The batch number.
    pub batch_number: u64,
    /// The address receiving the batch fees.
    pub coinbase: Address,
    /// The batch timestamp.
    pub timestamp: u64,
    /// The global exit root used by the batch.
    pub global_exit_root: B256,
}

/// The result of closing a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingReceipt {
    /// The batch number.
    pub batch_number: u64,
    /// The state root after the batch.
    pub state_root: B256,
    /// The local exit root after the batch.
    pub local_exit_root: B256,
}

/// The outcome of one transaction of a processed batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionResponse {
    /// The transaction hash.
    pub tx_hash: B256,
    /// The network encoded transaction.
    pub encoded: Bytes,
    /// The state root after the transaction.
    pub state_root: B256,
}

/// The outcome of processing a batch through the executor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessBatchResponse {
    /// The state root after the batch.
    pub new_state_root: B256,
    /// The local exit root after the batch.
    pub new_local_exit_root: B256,
    /// The accumulated input hash after the batch.
    pub new_acc_input_hash: B256,
    /// The per transaction outcomes.
    pub responses: Vec<TransactionResponse>,
}

/// An account funded at genesis.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenesisAccount {
    /// The account address.
    pub address: Address,
    /// The account balance.
    pub balance: U256,
    /// The account nonce.
    pub nonce: u64,
}

/// The genesis of the L2.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Genesis {
    /// The expected genesis state root.
    pub root: B256,
    /// The funded accounts.
    pub accounts: Vec<GenesisAccount>,
}
