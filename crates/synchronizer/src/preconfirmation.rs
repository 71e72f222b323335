//! The preconfirmation loop, storing the batches served by the availability service ahead of
//! their sequencing on the base chain.

use crate::{error::SynchronizerResult, processor::BlockProcessor, stopped, SynchronizerMetrics};
use rollup_sync_providers::{AvailabilityProvider, ChainGateway};
use rollup_sync_state::StateProvider;
use rollup_sync_watcher::RollupWatcher;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;

/// Polls the availability service and stores the preconfirmed batches. It shares nothing with
/// the main loop but the state.
#[derive(Debug)]
pub(crate) struct PreconfirmationSyncer<G, A, S> {
    pub(crate) watcher: Arc<RollupWatcher<G, A>>,
    pub(crate) processor: BlockProcessor<S>,
    pub(crate) metrics: SynchronizerMetrics,
    pub(crate) interval: Duration,
    pub(crate) shutdown: watch::Receiver<bool>,
}

impl<G, A, S> PreconfirmationSyncer<G, A, S>
where
    G: ChainGateway,
    A: AvailabilityProvider,
    S: StateProvider,
{
    /// Runs the loop until shutdown or a fatal error.
    pub(crate) async fn run(mut self) -> SynchronizerResult<()> {
        tracing::info!(target: "rollup::sync::preconf", interval = ?self.interval, "starting preconfirmations loop");
        loop {
            tokio::select! {
                biased;

                _ = stopped(&mut self.shutdown) => return Ok(()),
                _ = tokio::time::sleep(self.interval) => {}
            }

            if let Err(err) = self.sync_preconfirmations().await {
                if err.is_fatal() {
                    tracing::error!(target: "rollup::sync::preconf", %err, "fatal error syncing preconfirmations");
                    return Err(err);
                }
                tracing::warn!(target: "rollup::sync::preconf", %err, "error syncing preconfirmations");
            }
        }
    }

    /// Stores the preconfirmed batches until the availability service has no new batch.
    pub(crate) async fn sync_preconfirmations(&self) -> SynchronizerResult<()> {
        while !*self.shutdown.borrow() {
            let cursor = self.processor.state().get_last_batch_info().await?;
            let info = self.watcher.get_preconfirmations(cursor).await?;
            if info.is_empty() {
                return Ok(());
            }

            let batches = info.blocks.iter().map(|b| b.sequenced_batches.len() as u64).sum();
            self.processor.process_block_range(&info, &self.shutdown).await?;
            self.metrics.preconfirmation_batches.increment(batches);
            tracing::debug!(target: "rollup::sync::preconf", batches, "stored preconfirmed batches");
        }
        Ok(())
    }
}
