//! Exposes the [`BroadcastClient`] trait allowing to retrieve the trusted state from the trusted
//! sequencer broadcast service.

use alloy_json_rpc::RpcError;
use alloy_primitives::{Address, Bytes, B256};
use alloy_rpc_client::RpcClient;
use alloy_transport::TransportErrorKind;
use reqwest::Url;

/// The JSON-RPC method of the trusted sequencer returning the broadcast service URI.
const BROADCAST_URI_METHOD: &str = "zkevm_getBroadcastURI";

/// The broadcast method returning the last trusted batch.
const LAST_BATCH_METHOD: &str = "broadcast_getLastBatch";

/// The broadcast method returning a trusted batch by number.
const BATCH_METHOD: &str = "broadcast_getBatch";

/// An error occurring at the [`BroadcastClient`].
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The provided url could not be parsed.
    #[error("invalid url {0}")]
    InvalidUrl(String),
    /// Broadcast RPC error.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

/// The summary of the last trusted batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedBatchSummary {
    /// The batch number.
    pub batch_number: u64,
}

/// A transaction of a trusted batch.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrustedTransaction {
    /// The network encoded transaction.
    pub encoded: Bytes,
}

/// A batch as reported by the trusted sequencer.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedBatch {
    /// The batch number.
    pub batch_number: u64,
    /// The global exit root used by the batch.
    pub global_exit_root: B256,
    /// The local exit root after the batch.
    pub local_exit_root: B256,
    /// The state root after the batch, zero while the batch is open.
    pub state_root: B256,
    /// The sequencer, used as the batch coinbase.
    pub sequencer: Address,
    /// The batch timestamp.
    pub timestamp: u64,
    /// The batch transactions.
    pub transactions: Vec<TrustedTransaction>,
}

impl TrustedBatch {
    /// Returns true if the sequencer closed the batch.
    pub fn is_closed(&self) -> bool {
        !self.state_root.is_zero()
    }
}

/// An implementation of the trait serves the trusted state.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait BroadcastClient: Send + Sync {
    /// Returns the last trusted batch.
    async fn get_last_batch(&self) -> Result<TrustedBatchSummary, BroadcastError>;

    /// Returns the trusted batch with the provided number.
    async fn get_batch(&self, batch_number: u64) -> Result<TrustedBatch, BroadcastError>;
}

/// An implementation of the trait resolves and connects to the broadcast service of a trusted
/// sequencer.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait BroadcastConnector: Send + Sync {
    /// The connected client.
    type Client: BroadcastClient;

    /// Resolves the broadcast service from the trusted sequencer JSON-RPC url and connects to it.
    async fn connect(&self, trusted_sequencer_url: &str) -> Result<Self::Client, BroadcastError>;
}

fn parse_url(url: &str) -> Result<Url, BroadcastError> {
    Url::parse(url).map_err(|err| BroadcastError::InvalidUrl(format!("{url}: {err}")))
}

/// A JSON-RPC implementation of the [`BroadcastClient`].
#[derive(Debug, Clone)]
pub struct RpcBroadcastClient {
    client: RpcClient,
}

impl RpcBroadcastClient {
    /// Returns a new [`RpcBroadcastClient`] for the provided url.
    pub fn new_http(url: &str) -> Result<Self, BroadcastError> {
        Ok(Self { client: RpcClient::new_http(parse_url(url)?) })
    }
}

#[async_trait::async_trait]
impl BroadcastClient for RpcBroadcastClient {
    async fn get_last_batch(&self) -> Result<TrustedBatchSummary, BroadcastError> {
        Ok(self.client.request_noparams(LAST_BATCH_METHOD).await?)
    }

    async fn get_batch(&self, batch_number: u64) -> Result<TrustedBatch, BroadcastError> {
        Ok(self.client.request(BATCH_METHOD, (batch_number,)).await?)
    }
}

/// A [`BroadcastConnector`] resolving the broadcast URI over the trusted sequencer JSON-RPC.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcBroadcastConnector;

#[async_trait::async_trait]
impl BroadcastConnector for RpcBroadcastConnector {
    type Client = RpcBroadcastClient;

    async fn connect(&self, trusted_sequencer_url: &str) -> Result<Self::Client, BroadcastError> {
        let sequencer = RpcClient::new_http(parse_url(trusted_sequencer_url)?);
        let uri: String = sequencer.request_noparams(BROADCAST_URI_METHOD).await?;
        tracing::debug!(target: "rollup::providers", %uri, "resolved broadcast uri");

        RpcBroadcastClient::new_http(&uri)
    }
}
