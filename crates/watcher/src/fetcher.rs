//! Fetches L2 blocks from the availability service and converts them into sequenced batches.

use crate::{
    error::{WatcherError, WatcherResult},
    RollupWatcher,
};
use alloy_primitives::{hex, B256};
use rollup_sync_primitives::{L2BatchInfo, SequencedBatch};
use rollup_sync_providers::{
    AvailabilityError, AvailabilityProvider, ChainGateway, RollupContractProvider, SequencerBlock,
};

fn availability_error(height: u64, err: AvailabilityError) -> WatcherError {
    match err {
        AvailabilityError::Decode(err) => {
            WatcherError::MalformedPayload { height, reason: err.to_string() }
        }
        err => err.into(),
    }
}

impl<G, A> RollupWatcher<G, A>
where
    G: ChainGateway,
    A: AvailabilityProvider,
{
    /// Fetches the block at the provided availability service height, retrying while the service
    /// does not serve it.
    async fn fetch_sequencer_block(&self, height: u64) -> WatcherResult<SequencerBlock> {
        self.config
            .retry
            .retry_if(
                "fetch_l2_block",
                || self.availability.block(height),
                AvailabilityError::is_recoverable,
            )
            .await
            .map_err(|err| availability_error(height, err))
    }

    /// Returns the batch for the block at the provided availability service height and advances
    /// the cursor to it.
    ///
    /// Returns `None` for a batch at or below the cursor, which was already processed. A batch
    /// past the next expected one is a gap in the batch stream and is returned as an error.
    #[tracing::instrument(target = "rollup::watcher", skip_all, fields(height = height))]
    pub(crate) async fn fetch_l2_block(
        &self,
        height: u64,
        cursor: &mut L2BatchInfo,
    ) -> WatcherResult<Option<SequencedBatch>> {
        let mut block = self.fetch_sequencer_block(height).await?;

        let batch_number = height.saturating_sub(self.config.genesis_hotshot_block_number);
        let expected = cursor.next_number();
        if batch_number < expected {
            tracing::error!(target: "rollup::watcher", batch_number, ?cursor, "received old batch");
            self.metrics.skipped_batches.increment(1);
            return Ok(None);
        } else if batch_number > expected {
            return Err(WatcherError::BatchGap { batch_number, expected });
        }

        if block.l1_block < cursor.l1_block {
            tracing::warn!(target: "rollup::watcher", height, previous = cursor.l1_block, current = block.l1_block, "decreasing l1 block");
            self.metrics.clamped_metadata.increment(1);
            block.l1_block = cursor.l1_block;
        }
        if block.timestamp < cursor.timestamp {
            tracing::warn!(target: "rollup::watcher", height, previous = cursor.timestamp, current = block.timestamp, "decreasing timestamp");
            self.metrics.clamped_metadata.increment(1);
            block.timestamp = cursor.timestamp;
        }
        *cursor = L2BatchInfo::new(batch_number, block.l1_block, block.timestamp);

        tracing::debug!(target: "rollup::watcher", batch_number, l1_block = block.l1_block, timestamp = block.timestamp, "fetched l2 block");

        let transactions = hex::decode(&block.transactions)
            .map_err(|err| WatcherError::MalformedPayload { height, reason: err.to_string() })?;

        let manager = self.config.contracts.global_exit_root_manager;
        let code = self.gateway.code_at(manager, block.l1_block).await?;
        let global_exit_root = if code.is_empty() {
            // the manager was not deployed yet, the rollup cannot have transactions.
            if !transactions.is_empty() {
                return Err(WatcherError::TransactionsBeforeDeployment {
                    height,
                    l1_block: block.l1_block,
                });
            }
            B256::ZERO
        } else {
            self.gateway.last_global_exit_root(manager, block.l1_block).await?
        };

        self.metrics.sequenced_batches.increment(1);

        Ok(Some(SequencedBatch {
            batch_number,
            block_number: block.l1_block,
            transactions: transactions.into(),
            global_exit_root,
            timestamp: block.timestamp,
            ..Default::default()
        }))
    }
}
