//! Reconciliation of the local state with the trusted state reported by the trusted sequencer.

use crate::{
    error::{SynchronizerError, SynchronizerResult},
    stopped, Synchronizer,
};
use alloy_primitives::Bytes;
use rollup_sync_providers::{
    AvailabilityProvider, BroadcastClient, BroadcastConnector, ChainGateway,
    RollupContractProvider, TrustedBatch,
};
use rollup_sync_state::{
    codec, Batch, PendingTxManager, ProcessingContext, ProcessingReceipt, StateProvider,
    StateTransaction,
};

/// Returns the fields of the local batch which differ from the trusted one.
fn mismatches(local: &Batch, trusted: &TrustedBatch, trusted_data: &Bytes) -> Vec<&'static str> {
    let mut reasons = Vec::new();
    if local.batch_number != trusted.batch_number {
        reasons.push("batch_number");
    }
    if local.global_exit_root != trusted.global_exit_root {
        reasons.push("global_exit_root");
    }
    if local.local_exit_root != trusted.local_exit_root {
        reasons.push("local_exit_root");
    }
    if local.state_root != trusted.state_root {
        reasons.push("state_root");
    }
    if local.coinbase != trusted.sequencer {
        reasons.push("coinbase");
    }
    if local.timestamp != trusted.timestamp {
        reasons.push("timestamp");
    }
    if &local.batch_l2_data != trusted_data {
        reasons.push("batch_l2_data");
    }
    reasons
}

impl<G, A, S, M, C> Synchronizer<G, A, S, M, C>
where
    G: ChainGateway + 'static,
    A: AvailabilityProvider + 'static,
    S: StateProvider + Clone + 'static,
    M: PendingTxManager<S::Tx>,
    C: BroadcastConnector,
{
    /// Reconciles the batches from the provided one up to the last trusted batch.
    ///
    /// Each batch is reconciled in its own transaction. A failed reconciliation stops the loop
    /// until the next iteration.
    #[tracing::instrument(target = "rollup::sync::trusted", skip_all, fields(local = latest_synced_batch))]
    pub(crate) async fn sync_trusted_state(
        &self,
        latest_synced_batch: u64,
    ) -> SynchronizerResult<()> {
        if self.config.is_trusted_sequencer {
            return Ok(());
        }

        let rollup = self.watcher.config().contracts.rollup;
        let url = self.watcher.gateway().trusted_sequencer_url(rollup).await?;
        let client = self.connector.connect(&url).await?;

        let last_trusted = client.get_last_batch().await?.batch_number;
        tracing::debug!(target: "rollup::sync::trusted", last_trusted, "fetched trusted state info");
        if last_trusted < latest_synced_batch {
            return Ok(());
        }

        let mut shutdown = self.shutdown.clone();
        for batch_number in latest_synced_batch..=last_trusted {
            let trusted = tokio::select! {
                biased;

                _ = stopped(&mut shutdown) => {
                    tracing::info!(target: "rollup::sync::trusted", batch_number, "stop requested, interrupting reconciliation");
                    break;
                }
                res = client.get_batch(batch_number) => res?,
            };

            let mut tx = self.processor.state().begin().await?;
            if let Err(err) = self.process_trusted_batch(&mut tx, &trusted).await {
                tracing::error!(target: "rollup::sync::trusted", batch_number, %err, "failed to process trusted batch");
                if let Err(rollback) = tx.rollback().await {
                    return Err(SynchronizerError::Rollback { cause: Box::new(err), rollback });
                }
                break;
            }
            tx.commit().await?;
        }

        Ok(())
    }

    async fn process_trusted_batch(
        &self,
        tx: &mut S::Tx,
        trusted: &TrustedBatch,
    ) -> SynchronizerResult<()> {
        let batch_number = trusted.batch_number;
        tracing::debug!(target: "rollup::sync::trusted", batch_number, "processing trusted batch");

        let txs = trusted
            .transactions
            .iter()
            .map(|tx| codec::decode_transaction(&tx.encoded))
            .collect::<Result<Vec<_>, _>>()?;
        let data = codec::encode_transactions(&txs);

        match tx.get_batch_by_number(batch_number).await {
            Ok(local) => {
                let reasons = mismatches(&local, trusted, &data);
                if reasons.is_empty() {
                    tracing::debug!(target: "rollup::sync::trusted", batch_number, "batch already synchronized");
                    return Ok(());
                }
                tracing::info!(target: "rollup::sync::trusted", batch_number, ?reasons, "batch needs to be updated");
                self.metrics.trusted_reorgs.increment(1);
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(target: "rollup::sync::trusted", batch_number, "batch needs to be synchronized");
            }
            Err(err) => return Err(err.into()),
        }

        tx.reset_trusted_state(batch_number.saturating_sub(1)).await?;
        tx.open_batch(ProcessingContext {
            batch_number,
            coinbase: trusted.sequencer,
            timestamp: trusted.timestamp,
            global_exit_root: trusted.global_exit_root,
        })
        .await?;

        let response = tx.process_sequencer_batch(batch_number, data).await?;
        tx.store_transactions(batch_number, &response.responses).await?;

        if trusted.is_closed() {
            tracing::debug!(target: "rollup::sync::trusted", batch_number, "closing batch");
            tx.close_batch(ProcessingReceipt {
                batch_number,
                state_root: response.new_state_root,
                local_exit_root: response.new_local_exit_root,
            })
            .await?;
        }

        self.metrics.trusted_batches_reconciled.increment(1);
        tracing::info!(target: "rollup::sync::trusted", batch_number, closed = trusted.is_closed(), "batch synchronized");
        Ok(())
    }
}
