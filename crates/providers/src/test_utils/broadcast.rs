use crate::{
    BroadcastClient, BroadcastConnector, BroadcastError, TrustedBatch, TrustedBatchSummary,
};

use alloy_transport::TransportErrorKind;
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Default)]
struct BroadcastState {
    batches: BTreeMap<u64, TrustedBatch>,
    failing: bool,
    connections: Vec<String>,
}

/// An in-memory trusted sequencer broadcast service, acting as its own connector.
#[derive(Debug, Clone, Default)]
pub struct MockBroadcast {
    state: Arc<Mutex<BroadcastState>>,
}

impl MockBroadcast {
    /// Serves the trusted batch, replacing any batch with the same number.
    pub fn push_batch(&self, batch: TrustedBatch) {
        self.state.lock().batches.insert(batch.batch_number, batch);
    }

    /// Makes every request fail while set.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Returns the urls the connector was asked to connect to.
    pub fn connections(&self) -> Vec<String> {
        self.state.lock().connections.clone()
    }

    fn check(&self) -> Result<(), BroadcastError> {
        if self.state.lock().failing {
            return Err(TransportErrorKind::custom_str("broadcast unavailable").into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BroadcastClient for MockBroadcast {
    async fn get_last_batch(&self) -> Result<TrustedBatchSummary, BroadcastError> {
        self.check()?;
        let batch_number =
            self.state.lock().batches.last_key_value().map(|(n, _)| *n).unwrap_or_default();
        Ok(TrustedBatchSummary { batch_number })
    }

    async fn get_batch(&self, batch_number: u64) -> Result<TrustedBatch, BroadcastError> {
        self.check()?;
        self.state
            .lock()
            .batches
            .get(&batch_number)
            .cloned()
            .ok_or_else(|| TransportErrorKind::custom_str("batch not found").into())
    }
}

#[async_trait::async_trait]
impl BroadcastConnector for MockBroadcast {
    type Client = Self;

    async fn connect(&self, trusted_sequencer_url: &str) -> Result<Self::Client, BroadcastError> {
        self.state.lock().connections.push(trusted_sequencer_url.to_string());
        self.check()?;
        Ok(self.clone())
    }
}
