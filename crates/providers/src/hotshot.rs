//! Exposes the [`AvailabilityProvider`] trait allowing to retrieve preconfirmed L2 blocks from the
//! `HotShot` query service.

use reqwest::Client;
use serde::de::DeserializeOwned;

/// The block height method of the availability API.
const BLOCK_HEIGHT_METHOD: &str = "availability/block-height";

/// The block method prefix of the availability API.
const BLOCK_METHOD_PREFIX: &str = "availability/block";

/// An error occurring at the [`AvailabilityProvider`].
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    /// The request failed or the service answered with an error status.
    #[error("availability service request error: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a payload that could not be decoded.
    #[error("malformed availability payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// The service does not serve the block yet.
    #[error("block {0} not available")]
    Unavailable(u64),
}

impl AvailabilityError {
    /// Returns true if retrying the request can succeed.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Unavailable(_))
    }
}

/// An L2 block as served by the availability service.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequencerBlock {
    /// The block timestamp.
    pub timestamp: u64,
    /// The `HotShot` height of the block.
    pub height: u64,
    /// The base chain block the block is anchored to.
    pub l1_block: u64,
    /// The hex encoded transactions blob.
    pub transactions: String,
}

/// An implementation of the trait can serve preconfirmed L2 blocks.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait AvailabilityProvider: Send + Sync {
    /// Returns the current block height of the service.
    async fn block_height(&self) -> Result<u64, AvailabilityError>;

    /// Returns the block at the provided height.
    async fn block(&self, height: u64) -> Result<SequencerBlock, AvailabilityError>;
}

/// An online implementation of the `HotShot` availability client.
#[derive(Debug, Clone)]
pub struct HotShotClient {
    /// The base URL of the query service.
    pub base: String,
    /// The inner reqwest client.
    pub inner: Client,
}

impl HotShotClient {
    /// Creates a new [`HotShotClient`] from the provided base url.
    pub fn new_http(mut base: String) -> Self {
        // If base ends with a slash, remove it
        if base.ends_with('/') {
            base.remove(base.len() - 1);
        }
        Self { base, inner: Client::new() }
    }

    async fn get<T: DeserializeOwned>(&self, path: String) -> Result<T, AvailabilityError> {
        let response = self
            .inner
            .get(format!("{}/{}", self.base, path))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&response)?)
    }
}

#[async_trait::async_trait]
impl AvailabilityProvider for HotShotClient {
    async fn block_height(&self) -> Result<u64, AvailabilityError> {
        self.get(BLOCK_HEIGHT_METHOD.to_string()).await
    }

    async fn block(&self, height: u64) -> Result<SequencerBlock, AvailabilityError> {
        self.get(format!("{BLOCK_METHOD_PREFIX}/{height}")).await
    }
}
