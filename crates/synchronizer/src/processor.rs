//! Applies the rollup information returned by the watcher to the state, one transaction per
//! block.

use crate::{
    error::{SynchronizerError, SynchronizerResult},
    SynchronizerMetrics,
};
use rollup_sync_primitives::{
    BlockEvent, L1Block, L1BlockHeader, RollupInfo, Sequence, SequencedBatch, VerifiedBatch,
};
use rollup_sync_state::{
    Batch, ProcessingContext, StateProvider, StateTransaction, VirtualBatch,
};
use tokio::sync::watch;

/// Rolls back the transaction after the provided failure. A failed rollback is escalated to
/// [`SynchronizerError::Rollback`].
pub(crate) async fn rollback<Tx: StateTransaction>(
    tx: Tx,
    cause: SynchronizerError,
) -> SynchronizerError {
    match tx.rollback().await {
        Ok(()) => cause,
        Err(rollback) => {
            tracing::error!(target: "rollup::sync", %cause, %rollback, "failed to roll back transaction");
            SynchronizerError::Rollback { cause: Box::new(cause), rollback }
        }
    }
}

/// Stores blocks along with their events.
#[derive(Debug, Clone)]
pub(crate) struct BlockProcessor<S> {
    state: S,
    metrics: SynchronizerMetrics,
}

impl<S: StateProvider> BlockProcessor<S> {
    pub(crate) const fn new(state: S, metrics: SynchronizerMetrics) -> Self {
        Self { state, metrics }
    }

    pub(crate) const fn state(&self) -> &S {
        &self.state
    }

    /// Stores the blocks of the rollup information in order, each in its own transaction.
    ///
    /// Stops before the next block once a stop is requested. Returns the last stored block.
    pub(crate) async fn process_block_range(
        &self,
        info: &RollupInfo,
        shutdown: &watch::Receiver<bool>,
    ) -> SynchronizerResult<Option<L1BlockHeader>> {
        let mut last_stored = None;
        for block in &info.blocks {
            if *shutdown.borrow() {
                tracing::debug!(target: "rollup::sync", block = block.number(), "stop requested, interrupting block processing");
                break;
            }

            let mut tx = self.state.begin().await?;
            if let Err(err) = self.process_block(&mut tx, info, block).await {
                tracing::error!(target: "rollup::sync", block = block.number(), %err, "failed to process block");
                return Err(rollback(tx, err).await);
            }
            tx.commit().await?;
            self.metrics.blocks_processed.increment(1);
            last_stored = Some(block.header);
        }
        Ok(last_stored)
    }

    #[tracing::instrument(target = "rollup::sync", skip_all, fields(block = block.number()))]
    async fn process_block(
        &self,
        tx: &mut S::Tx,
        info: &RollupInfo,
        block: &L1Block,
    ) -> SynchronizerResult<()> {
        tx.add_block(&block.header).await?;

        for event in info.events(block) {
            match event {
                Some(BlockEvent::GlobalExitRoot(root)) => {
                    tx.add_global_exit_root(root).await?;
                }
                Some(BlockEvent::SequencedBatches(batches)) => {
                    self.process_sequence_batches(tx, batches, block.number()).await?;
                }
                Some(BlockEvent::TrustedVerifyBatch(verified)) => {
                    self.process_trusted_verify_batch(tx, verified).await?;
                }
                None => return Err(SynchronizerError::InvalidOrder { block: block.number() }),
            }
        }

        tracing::trace!(target: "rollup::sync", "block processed");
        Ok(())
    }

    async fn process_sequence_batches(
        &self,
        tx: &mut S::Tx,
        batches: &[SequencedBatch],
        block_number: u64,
    ) -> SynchronizerResult<()> {
        let Some(sequence) = Sequence::from_batches(batches) else {
            tracing::warn!(target: "rollup::sync", block_number, "empty sequence, ignoring");
            return Ok(());
        };

        for sequenced in batches {
            let batch_number = sequenced.batch_number;
            let batch = Batch {
                batch_number,
                coinbase: sequenced.coinbase,
                batch_l2_data: sequenced.transactions.clone(),
                global_exit_root: sequenced.global_exit_root,
                timestamp: sequenced.timestamp,
                ..Default::default()
            };
            let acc_input_hash = tx
                .execute_batch(&batch)
                .await
                .map_err(|source| SynchronizerError::Execution { batch_number, source })?;

            match tx.get_batch_by_number(batch_number).await {
                Ok(_) => tx.add_accumulated_input_hash(batch_number, acc_input_hash).await?,
                Err(err) if err.is_not_found() => {
                    let context = ProcessingContext {
                        batch_number,
                        coinbase: sequenced.coinbase,
                        timestamp: sequenced.timestamp,
                        global_exit_root: sequenced.global_exit_root,
                    };
                    let state_root = tx
                        .process_and_store_closed_batch(context, batch.batch_l2_data)
                        .await
                        .map_err(|source| SynchronizerError::Execution { batch_number, source })?;
                    tracing::debug!(target: "rollup::sync", batch_number, ?state_root, "stored sequenced batch");
                }
                Err(err) => return Err(err.into()),
            }

            tx.add_virtual_batch(&VirtualBatch {
                batch_number,
                tx_hash: sequenced.tx_hash,
                coinbase: sequenced.coinbase,
                sequencer: sequenced.sequencer,
                block_number,
            })
            .await?;
        }

        tx.add_sequence(&sequence).await?;
        Ok(())
    }

    async fn process_trusted_verify_batch(
        &self,
        tx: &mut S::Tx,
        verified: &VerifiedBatch,
    ) -> SynchronizerResult<()> {
        let last_verified = match tx.get_last_verified_batch().await {
            Ok(batch) => batch.batch_number,
            Err(err) if err.is_not_found() => 0,
            Err(err) => return Err(err.into()),
        };

        let batch = tx.get_batch_by_number(verified.batch_number).await?;
        if batch.state_root != verified.state_root {
            return Err(SynchronizerError::VerifiedRootMismatch {
                batch_number: verified.batch_number,
                local: batch.state_root,
                verified: verified.state_root,
            });
        }

        for batch_number in last_verified + 1..=verified.batch_number {
            tx.add_verified_batch(&VerifiedBatch { batch_number, is_trusted: true, ..*verified })
                .await?;
        }
        tracing::debug!(target: "rollup::sync", from = last_verified + 1, to = verified.batch_number, "verified batches");
        Ok(())
    }
}
