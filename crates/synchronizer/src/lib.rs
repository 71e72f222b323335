//! The rollup synchronizer.
//!
//! Keeps the local state consistent with the rollup events of the base chain, the preconfirmed
//! batches of the availability service and the trusted state of the trusted sequencer.

mod config;
pub use config::{SynchronizerConfig, DEFAULT_SYNC_CHUNK_SIZE, DEFAULT_SYNC_INTERVAL};

mod error;
use error::SynchronizerResult;
pub use error::SynchronizerError;

mod metrics;
pub use metrics::SynchronizerMetrics;

mod preconfirmation;
use preconfirmation::PreconfirmationSyncer;

mod processor;
use processor::{rollback, BlockProcessor};

mod reorg;
mod trusted;

use rollup_sync_primitives::{L1Block, L1BlockHeader};
use rollup_sync_providers::{
    AvailabilityProvider, BroadcastConnector, ChainGateway, RollupContractProvider,
};
use rollup_sync_state::{PendingTxManager, StateError, StateProvider, StateTransaction};
use rollup_sync_watcher::RollupWatcher;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;

/// Resolves once a stop is requested or the sending half is dropped.
pub(crate) async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// A handle to request the [`Synchronizer`] to stop.
#[derive(Debug, Clone)]
pub struct SynchronizerHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl SynchronizerHandle {
    /// Requests the synchronizer to stop. The loops exit at their next suspension point and
    /// in-flight transactions are dropped without being committed.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }
}

/// The synchronizer drives the state from the base chain, the availability service and the
/// trusted sequencer.
#[derive(Debug)]
pub struct Synchronizer<G, A, S, M, C> {
    /// The rollup watcher, shared with the preconfirmation loop.
    watcher: Arc<RollupWatcher<G, A>>,
    /// The processor storing blocks in the state.
    processor: BlockProcessor<S>,
    /// The pending transactions manager notified on reorgs.
    tx_manager: M,
    /// The connector to the trusted sequencer broadcast service.
    connector: C,
    /// The synchronizer configuration.
    config: Arc<SynchronizerConfig>,
    /// The metrics for the synchronizer.
    metrics: SynchronizerMetrics,
    /// The sending half of the stop signal.
    shutdown_tx: Arc<watch::Sender<bool>>,
    /// The stop signal.
    shutdown: watch::Receiver<bool>,
}

impl<G, A, S, M, C> Synchronizer<G, A, S, M, C>
where
    G: ChainGateway + 'static,
    A: AvailabilityProvider + 'static,
    S: StateProvider + Clone + 'static,
    M: PendingTxManager<S::Tx>,
    C: BroadcastConnector,
{
    /// Returns a new [`Synchronizer`].
    pub fn new(
        watcher: RollupWatcher<G, A>,
        state: S,
        tx_manager: M,
        connector: C,
        config: SynchronizerConfig,
    ) -> Self {
        let metrics = SynchronizerMetrics::default();
        let (shutdown_tx, shutdown) = watch::channel(false);
        Self {
            watcher: Arc::new(watcher),
            processor: BlockProcessor::new(state, metrics.clone()),
            tx_manager,
            connector,
            config: Arc::new(config),
            metrics,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown,
        }
    }

    /// Returns true once a stop is requested.
    pub(crate) fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Returns a handle to stop the synchronizer.
    pub fn handle(&self) -> SynchronizerHandle {
        SynchronizerHandle { shutdown: self.shutdown_tx.clone() }
    }

    /// Runs the synchronization until stopped or until a fatal error occurs.
    ///
    /// Non fatal errors are logged and retried after the sync interval.
    pub async fn sync(mut self) -> Result<(), SynchronizerError> {
        tracing::info!(target: "rollup::sync", "sync started");

        let Some(mut last_synced) = self.bootstrap_until_ready().await? else {
            return Ok(());
        };

        let mut preconfirmations = self.config.use_preconfirmations().then(|| {
            let syncer = PreconfirmationSyncer {
                watcher: self.watcher.clone(),
                processor: self.processor.clone(),
                metrics: self.metrics.clone(),
                interval: self.config.preconfirmations_sync_interval,
                shutdown: self.shutdown_tx.subscribe(),
            };
            tokio::spawn(syncer.run())
        });

        let mut wait = Duration::ZERO;
        let result = loop {
            tokio::select! {
                biased;

                _ = stopped(&mut self.shutdown) => break Ok(()),
                res = async {
                    match preconfirmations.as_mut() {
                        Some(task) => task.await,
                        None => std::future::pending().await,
                    }
                } => break res.map_err(SynchronizerError::from).and_then(|res| res),
                _ = tokio::time::sleep(wait) => {}
            }
            wait = self.config.sync_interval;

            if let Err(err) = self.iterate(&mut last_synced).await {
                if err.is_fatal() {
                    tracing::error!(target: "rollup::sync", %err, "fatal error, stopping synchronization");
                    break Err(err);
                }
                tracing::warn!(target: "rollup::sync", %err, "synchronization iteration failed");
            }
        };

        if let Some(task) = preconfirmations {
            task.abort();
        }
        tracing::info!(target: "rollup::sync", "sync stopped");
        result
    }

    /// Bootstraps the state, retrying non fatal errors. Returns `None` if stopped first.
    async fn bootstrap_until_ready(&mut self) -> SynchronizerResult<Option<L1BlockHeader>> {
        loop {
            match self.bootstrap().await {
                Ok(block) => return Ok(Some(block)),
                Err(err) if err.is_fatal() => {
                    tracing::error!(target: "rollup::sync", %err, "failed to bootstrap");
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(target: "rollup::sync", %err, "failed to bootstrap, retrying");
                }
            }

            tokio::select! {
                biased;

                _ = stopped(&mut self.shutdown) => return Ok(None),
                _ = tokio::time::sleep(self.config.sync_interval) => {}
            }
        }
    }

    /// Returns the last synchronized block, setting the genesis if the state is empty.
    async fn bootstrap(&self) -> SynchronizerResult<L1BlockHeader> {
        let mut tx = self.processor.state().begin().await?;
        let last_synced = match tx.get_last_block().await {
            Ok(block) => block,
            Err(StateError::StateNotSynchronized) => match self.set_genesis(&mut tx).await {
                Ok(block) => block,
                Err(err) => return Err(rollback(tx, err).await),
            },
            Err(err) => return Err(rollback(tx, err.into()).await),
        };
        tx.commit().await?;

        tracing::info!(target: "rollup::sync", block = last_synced.number, "resuming from block");
        Ok(last_synced)
    }

    async fn set_genesis(&self, tx: &mut S::Tx) -> SynchronizerResult<L1BlockHeader> {
        let gen_block_number = self.config.gen_block_number;
        let gateway = self.watcher.gateway();
        tracing::info!(target: "rollup::sync", gen_block_number, "state is empty, setting genesis");

        if !self.config.ignore_gen_block_number_check {
            let rollup = self.watcher.config().contracts.rollup;
            if !gateway.verify_gen_block_number(rollup, gen_block_number).await? {
                return Err(SynchronizerError::InvalidGenesisBlock(gen_block_number));
            }
        }

        let header = gateway.block_by_number(gen_block_number).await?;
        let root = tx.set_genesis(&header, &self.config.genesis).await?;
        if root != self.config.genesis.root {
            return Err(SynchronizerError::GenesisRootMismatch {
                expected: self.config.genesis.root,
                computed: root,
            });
        }

        tracing::debug!(target: "rollup::sync", ?root, "genesis root matches");
        Ok(header)
    }

    /// Runs one iteration of the main loop: catches up with the base chain, then reconciles the
    /// trusted state if every sequenced batch is synchronized.
    async fn iterate(&self, last_synced: &mut L1BlockHeader) -> SynchronizerResult<()> {
        if let Err(err) = self.sync_blocks(last_synced).await {
            if err.is_fatal() {
                return Err(err);
            }
            tracing::warn!(target: "rollup::sync", %err, "error syncing blocks");
            // blocks committed before the failure stay stored.
            *last_synced = self.processor.state().get_last_block().await?;
        }
        if self.is_stopped() {
            return Ok(());
        }

        let rollup = self.watcher.config().contracts.rollup;
        let latest_sequenced_batch = self.watcher.gateway().latest_batch_number(rollup).await?;
        let latest_synced_batch = self.processor.state().get_last_batch_number().await?;
        if latest_synced_batch >= latest_sequenced_batch {
            tracing::info!(target: "rollup::sync", latest_synced_batch, "l1 state fully synchronized");
            self.sync_trusted_state(latest_synced_batch).await?;
        }
        Ok(())
    }

    /// Scans the base chain from the last synchronized block up to the head, chunk by chunk.
    #[tracing::instrument(target = "rollup::sync", skip_all, fields(from = last_synced.number))]
    async fn sync_blocks(&self, last_synced: &mut L1BlockHeader) -> SynchronizerResult<()> {
        if let Some(block) = self.check_reorg(*last_synced).await? {
            self.reset_state(block.number).await?;
            *last_synced = block;
            return Ok(());
        }

        let gateway = self.watcher.gateway();
        let head = gateway.latest_header().await?.number;
        let chunk_size = self.config.sync_chunk_size.max(1);
        let use_preconfirmations = self.config.use_preconfirmations();

        let mut shutdown = self.shutdown.clone();
        let mut from = last_synced.number + 1;
        while from <= head {
            let to = from.saturating_add(chunk_size - 1).min(head);
            tracing::info!(target: "rollup::sync", from, to, head, "getting rollup info");

            let cursor = self.processor.state().get_last_batch_info().await?;
            let mut info = tokio::select! {
                biased;

                _ = stopped(&mut shutdown) => break,
                res = self.watcher.get_rollup_info_by_block_range(
                    from,
                    Some(to),
                    cursor,
                    use_preconfirmations,
                ) => res?,
            };

            // the cursor always ends a chunk on its upper bound.
            if info.last_block().is_none_or(|block| block.number() < to) {
                let header = gateway.block_by_number(to).await?;
                tracing::debug!(target: "rollup::sync", block = to, "storing chunk bound");
                info.blocks.push(L1Block::new(header));
            }

            let stored = self.processor.process_block_range(&info, &self.shutdown).await?;
            if let Some(block) = stored {
                *last_synced = block;
            }
            if last_synced.number < to {
                tracing::info!(target: "rollup::sync", block = last_synced.number, "stop requested, interrupting catch up");
                break;
            }
            from = to + 1;
        }

        Ok(())
    }
}
