//! Rollup watcher for the rollup synchronizer.
//!
//! Scans ranges of base chain blocks for rollup events and the availability service for
//! preconfirmed batches, returning the decoded events grouped per block along with the order in
//! which they were emitted.

mod builder;
use builder::RollupInfoBuilder;

mod config;
pub use config::{
    ContractAddresses, WatcherConfig, AVAILABILITY_FETCH_ATTEMPTS, AVAILABILITY_FETCH_DELAY,
};

mod error;
use error::WatcherResult;
pub use error::{FilterLogError, WatcherError};

mod fetcher;

mod metrics;
pub use metrics::WatcherMetrics;

use alloy_rpc_types_eth::{Filter, Log};
use rollup_sync_l1::{
    abi::logs::{NewBlocks, UpdateGlobalExitRoot, VerifyBatchesTrustedAggregator},
    RollupEvent,
};
use rollup_sync_primitives::{GlobalExitRoot, L1BlockHeader, L2BatchInfo, RollupInfo, VerifiedBatch};
use rollup_sync_providers::{AvailabilityProvider, ChainGateway};
use std::sync::Arc;

/// The rollup watcher decodes the rollup events of the base chain and the preconfirmed batches of
/// the availability service.
#[derive(Debug)]
pub struct RollupWatcher<G, A> {
    /// The base chain gateway.
    gateway: G,
    /// The availability service serving preconfirmed blocks.
    availability: A,
    /// The watcher configuration.
    config: Arc<WatcherConfig>,
    /// The metrics for the watcher.
    metrics: WatcherMetrics,
}

impl<G, A> RollupWatcher<G, A>
where
    G: ChainGateway,
    A: AvailabilityProvider,
{
    /// Returns a new [`RollupWatcher`].
    pub fn new(gateway: G, availability: A, config: Arc<WatcherConfig>) -> Self {
        Self { gateway, availability, config, metrics: WatcherMetrics::default() }
    }

    /// Returns a reference to the base chain gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns a reference to the watcher configuration.
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Returns the rollup events emitted in the block range, starting the batch sequencing checks
    /// from the provided cursor. The range is open ended if `to` is `None`.
    ///
    /// When `use_preconfirmations` is set, the new blocks events are ignored since their batches
    /// are ingested from the availability service. Any error aborts the whole range.
    #[tracing::instrument(
        target = "rollup::watcher",
        skip_all,
        fields(from = from, to = ?to, use_preconfirmations = use_preconfirmations)
    )]
    pub async fn get_rollup_info_by_block_range(
        &self,
        from: u64,
        to: Option<u64>,
        mut cursor: L2BatchInfo,
        use_preconfirmations: bool,
    ) -> WatcherResult<RollupInfo> {
        let mut filter = Filter::new().from_block(from).address(self.config.contracts.to_vec());
        if let Some(to) = to {
            filter = filter.to_block(to);
        }

        let logs = self.gateway.filter_logs(&filter).await?;
        tracing::trace!(target: "rollup::watcher", logs = logs.len(), "fetched logs");

        let mut builder = RollupInfoBuilder::default();
        for log in &logs {
            if let Err(err) =
                self.process_log(log, &mut builder, &mut cursor, use_preconfirmations).await
            {
                tracing::warn!(target: "rollup::watcher", ?err, ?log, "failed to process log");
                return Err(err);
            }
        }

        Ok(builder.build())
    }

    /// Returns the batches preconfirmed by the availability service past the provided cursor.
    ///
    /// Each batch is its own group, attached to the base chain block it is anchored to.
    #[tracing::instrument(target = "rollup::watcher", skip_all, fields(cursor = %cursor))]
    pub async fn get_preconfirmations(&self, mut cursor: L2BatchInfo) -> WatcherResult<RollupInfo> {
        let height = self.availability.block_height().await?;
        let from = cursor.next_number() + self.config.genesis_hotshot_block_number;
        tracing::debug!(target: "rollup::watcher", from, height, "fetching preconfirmed blocks");

        let mut builder = RollupInfoBuilder::default();
        for height in from..height {
            let Some(batch) = self.fetch_l2_block(height, &mut cursor).await? else { continue };
            let header = self.header_by_number(&builder, batch.block_number).await?;
            builder.push_sequenced_batches(header, vec![batch]);
        }

        Ok(builder.build())
    }

    async fn process_log(
        &self,
        log: &Log,
        builder: &mut RollupInfoBuilder,
        cursor: &mut L2BatchInfo,
        use_preconfirmations: bool,
    ) -> WatcherResult<()> {
        match RollupEvent::try_decode(&log.inner)? {
            RollupEvent::NewBlocks(_) if use_preconfirmations => {
                tracing::trace!(target: "rollup::watcher", "ignoring new blocks event");
            }
            RollupEvent::NewBlocks(event) => {
                self.handle_new_blocks(log, event, builder, cursor).await?;
            }
            RollupEvent::UpdateGlobalExitRoot(event) => {
                self.handle_global_exit_root(log, event, builder).await?;
            }
            RollupEvent::VerifyBatchesTrustedAggregator(event) => {
                self.handle_trusted_verification(log, event, builder).await?;
            }
            RollupEvent::VerifyBatches(event) => {
                tracing::warn!(target: "rollup::watcher", num_batch = event.numBatch, "verify batches event not implemented");
            }
            event @ (RollupEvent::SequenceBatches(_) | RollupEvent::Admin(_)) => {
                tracing::debug!(target: "rollup::watcher", event = event.name(), "event detected");
            }
            RollupEvent::Unknown(topic) => {
                tracing::warn!(target: "rollup::watcher", ?topic, "event not registered");
                self.metrics.unknown_events.increment(1);
            }
        }
        Ok(())
    }

    /// Returns the header of the block the log was emitted in, reusing the last block of the
    /// builder if it matches.
    async fn header_of(
        &self,
        log: &Log,
        builder: &RollupInfoBuilder,
    ) -> WatcherResult<L1BlockHeader> {
        let number = log.block_number.ok_or(FilterLogError::MissingBlockNumber)?;
        let hash = log.block_hash.ok_or(FilterLogError::MissingBlockHash)?;

        match builder.tip_matching(number, hash) {
            Some(header) => Ok(header),
            None => Ok(self.gateway.block_by_hash(hash).await?),
        }
    }

    async fn header_by_number(
        &self,
        builder: &RollupInfoBuilder,
        number: u64,
    ) -> WatcherResult<L1BlockHeader> {
        match builder.tip_at(number)? {
            Some(header) => Ok(header),
            None => Ok(self.gateway.block_by_number(number).await?),
        }
    }

    async fn handle_global_exit_root(
        &self,
        log: &Log,
        event: UpdateGlobalExitRoot,
        builder: &mut RollupInfoBuilder,
    ) -> WatcherResult<()> {
        let header = self.header_of(log, builder).await?;
        let root = GlobalExitRoot::new(header.number, event.mainnetExitRoot, event.rollupExitRoot);
        tracing::trace!(target: "rollup::watcher", block = header.number, global_exit_root = ?root.global_exit_root, "global exit root update");

        builder.push_global_exit_root(header, root);
        self.metrics.global_exit_roots.increment(1);
        Ok(())
    }

    async fn handle_trusted_verification(
        &self,
        log: &Log,
        event: VerifyBatchesTrustedAggregator,
        builder: &mut RollupInfoBuilder,
    ) -> WatcherResult<()> {
        let header = self.header_of(log, builder).await?;
        let verified = VerifiedBatch {
            block_number: header.number,
            batch_number: event.numBatch,
            aggregator: event.aggregator,
            tx_hash: log.transaction_hash.unwrap_or_default(),
            state_root: event.stateRoot,
            is_trusted: false,
        };
        tracing::trace!(target: "rollup::watcher", block = header.number, batch_number = event.numBatch, "trusted verification");

        builder.push_verified_batch(header, verified);
        self.metrics.verified_batches.increment(1);
        Ok(())
    }

    /// Fetches the batches announced by the new blocks event and pushes them as one group,
    /// attached to the block the event was emitted in.
    async fn handle_new_blocks(
        &self,
        log: &Log,
        event: NewBlocks,
        builder: &mut RollupInfoBuilder,
        cursor: &mut L2BatchInfo,
    ) -> WatcherResult<()> {
        let number = log.block_number.ok_or(FilterLogError::MissingBlockNumber)?;
        let tx_hash = log.transaction_hash.ok_or(FilterLogError::MissingTransactionHash)?;
        // order is checked before fetching anything.
        builder.tip_at(number)?;

        let tx = self.gateway.transaction_by_hash(tx_hash).await?;
        let first = event.firstBlockNumber.saturating_to::<u64>();
        let count = event.numBlocks.saturating_to::<u64>();
        tracing::debug!(target: "rollup::watcher", block = number, first, count, "new blocks event");

        let genesis = self.config.genesis_hotshot_block_number;
        let mut batches = Vec::new();
        for height in first..first.saturating_add(count) {
            if height <= genesis {
                tracing::info!(target: "rollup::watcher", height, genesis, "block not past genesis, skipping");
                continue;
            }
            if let Some(mut batch) = self.fetch_l2_block(height, cursor).await? {
                batch.sequencer = tx.from;
                batch.nonce = tx.nonce;
                batch.tx_hash = tx_hash;
                batches.push(batch);
            }
        }

        if batches.is_empty() {
            tracing::debug!(target: "rollup::watcher", block = number, "no new batches in event");
            return Ok(());
        }

        let header = self.header_by_number(builder, number).await?;
        builder.push_sequenced_batches(header, batches);
        Ok(())
    }
}
