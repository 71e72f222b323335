//! Exposes the [`ChainGateway`] trait, a narrow view of the base chain RPC used by the
//! synchronizer.

mod client;
pub use client::L1RpcGateway;

mod contracts;
pub use contracts::RollupContractProvider;

mod gas;
pub use gas::{GasPricer, MultiGasPricer};

use alloy_json_rpc::RpcError;
use alloy_primitives::{Address, Bytes, B256};
use alloy_rpc_types_eth::{Filter, Log, TransactionRequest};
use alloy_transport::TransportErrorKind;
use rollup_sync_primitives::L1BlockHeader;

/// The error message returned by nodes which pruned the requested historical state.
const MISSING_TRIE_NODE_MESSAGE: &str = "missing trie node";

/// An error occurring at the [`ChainGateway`].
#[derive(Debug, thiserror::Error)]
pub enum L1ProviderError {
    /// The requested item does not exist on the base chain.
    #[error("not found")]
    NotFound,
    /// The node does not have the historical state for the request.
    #[error("missing trie node")]
    MissingTrieNode,
    /// The transaction has not been included in a block yet.
    #[error("transaction {0} is still pending")]
    PendingTransaction(B256),
    /// A contract call returned data that could not be decoded.
    #[error("abi decoding error: {0}")]
    AbiDecode(#[from] alloy_sol_types::Error),
    /// None of the configured gas pricers returned a price.
    #[error("no gas price available")]
    NoGasPrice,
    /// L1 RPC error.
    #[error(transparent)]
    Rpc(RpcError<TransportErrorKind>),
}

impl From<RpcError<TransportErrorKind>> for L1ProviderError {
    fn from(value: RpcError<TransportErrorKind>) -> Self {
        match &value {
            RpcError::NullResp => Self::NotFound,
            RpcError::ErrorResp(payload) if payload.message.contains(MISSING_TRIE_NODE_MESSAGE) => {
                Self::MissingTrieNode
            }
            _ => Self::Rpc(value),
        }
    }
}

/// The fields of a base chain transaction the synchronizer relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct L1TransactionInfo {
    /// The transaction hash.
    pub hash: B256,
    /// The recovered sender.
    pub from: Address,
    /// The sender nonce.
    pub nonce: u64,
    /// The transaction calldata.
    pub input: Bytes,
    /// The including block, if any.
    pub block_number: Option<u64>,
}

/// The fields of a base chain receipt the synchronizer relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1ReceiptInfo {
    /// The transaction hash.
    pub transaction_hash: B256,
    /// The including block number.
    pub block_number: Option<u64>,
    /// The including block hash.
    pub block_hash: Option<B256>,
    /// Whether the transaction succeeded.
    pub status: bool,
    /// The gas used by the transaction.
    pub gas_used: u64,
}

/// An implementation of the trait provides access to the base chain.
///
/// Network errors are propagated unchanged, apart from [`L1ProviderError::NotFound`] and
/// [`L1ProviderError::MissingTrieNode`] which callers match on.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait ChainGateway: Send + Sync {
    /// Returns the logs matching the filter, ordered by block and log index.
    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, L1ProviderError>;

    /// Returns the header of the block at the provided number.
    async fn block_by_number(&self, number: u64) -> Result<L1BlockHeader, L1ProviderError>;

    /// Returns the header of the block with the provided hash.
    async fn block_by_hash(&self, hash: B256) -> Result<L1BlockHeader, L1ProviderError>;

    /// Returns the header of the latest block.
    async fn latest_header(&self) -> Result<L1BlockHeader, L1ProviderError>;

    /// Returns the transaction with the provided hash. Pending transactions yield
    /// [`L1ProviderError::PendingTransaction`].
    async fn transaction_by_hash(&self, hash: B256) -> Result<L1TransactionInfo, L1ProviderError>;

    /// Returns the receipt for the transaction, if it was mined.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<L1ReceiptInfo>, L1ProviderError>;

    /// Returns the code at the address for the provided block.
    async fn code_at(&self, address: Address, block: u64) -> Result<Bytes, L1ProviderError>;

    /// Executes a call against the address, at the provided block or at the latest block.
    async fn call(
        &self,
        to: Address,
        data: Bytes,
        block: Option<u64>,
    ) -> Result<Bytes, L1ProviderError>;

    /// Estimates the gas needed for the transaction.
    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, L1ProviderError>;

    /// Submits an already signed transaction, returning its hash.
    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<B256, L1ProviderError>;

    /// Returns the current nonce of the account.
    async fn nonce_at(&self, address: Address) -> Result<u64, L1ProviderError>;
}
