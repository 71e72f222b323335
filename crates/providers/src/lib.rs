//! The crate exposes the providers used by the rollup synchronizer: the base chain gateway, the
//! `HotShot` availability service and the trusted sequencer broadcast service.

pub use broadcast::{
    BroadcastClient, BroadcastConnector, BroadcastError, RpcBroadcastClient, RpcBroadcastConnector,
    TrustedBatch, TrustedBatchSummary, TrustedTransaction,
};
mod broadcast;

pub use hotshot::{AvailabilityError, AvailabilityProvider, HotShotClient, SequencerBlock};
mod hotshot;

pub use l1::{
    ChainGateway, GasPricer, L1ProviderError, L1ReceiptInfo, L1RpcGateway, L1TransactionInfo,
    MultiGasPricer, RollupContractProvider,
};
mod l1;

pub use retry::Retry;
mod retry;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;
