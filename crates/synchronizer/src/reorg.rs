//! Detection of base chain reorgs and reset of the state to the last block shared with the live
//! chain.

use crate::{
    error::{SynchronizerError, SynchronizerResult},
    processor::rollback,
    Synchronizer,
};
use rollup_sync_primitives::L1BlockHeader;
use rollup_sync_providers::{AvailabilityProvider, BroadcastConnector, ChainGateway};
use rollup_sync_state::{PendingTxManager, StateProvider, StateTransaction};

impl<G, A, S, M, C> Synchronizer<G, A, S, M, C>
where
    G: ChainGateway + 'static,
    A: AvailabilityProvider + 'static,
    S: StateProvider + Clone + 'static,
    M: PendingTxManager<S::Tx>,
    C: BroadcastConnector,
{
    /// Walks the stored blocks back from the provided one until a block matching the live chain
    /// is found. Returns the matching block if it differs from the provided one.
    ///
    /// If no stored block matches the live chain, the state is reset to empty and the reorg is
    /// reported as unresolvable.
    #[tracing::instrument(target = "rollup::sync::reorg", skip_all, fields(block = latest.number))]
    pub(crate) async fn check_reorg(
        &self,
        latest: L1BlockHeader,
    ) -> SynchronizerResult<Option<L1BlockHeader>> {
        let gateway = self.watcher.gateway();
        let mut candidate = latest;
        let mut depth = 0u64;

        loop {
            let live = gateway.block_by_number(candidate.number).await?;
            if live.number != candidate.number {
                return Err(SynchronizerError::BlockNumberMismatch {
                    expected: candidate.number,
                    actual: live.number,
                });
            }
            if live.matches(&candidate) || candidate.number <= self.config.gen_block_number {
                break;
            }

            depth += 1;
            tracing::debug!(
                target: "rollup::sync::reorg",
                number = candidate.number,
                stored = ?candidate.hash,
                live = ?live.hash,
                depth,
                "block mismatch, looking for the latest matching block"
            );

            let tx = self.processor.state().begin().await?;
            let previous = tx.get_previous_block(depth).await;
            tx.commit().await?;

            candidate = match previous {
                Ok(block) => block,
                Err(err) if err.is_not_found() => {
                    tracing::error!(target: "rollup::sync::reorg", depth, "no stored block matches the live chain, resetting state");
                    self.reset_state(0).await?;
                    return Err(SynchronizerError::UnresolvableReorg { block: latest.number });
                }
                Err(err) => return Err(err.into()),
            };
        }

        if candidate.hash == latest.hash {
            return Ok(None);
        }

        tracing::info!(target: "rollup::sync::reorg", from = latest.number, to = candidate.number, depth, "reorg detected");
        self.metrics.reorgs.increment(1);
        self.metrics.reorg_depth.record(depth as f64);
        Ok(Some(candidate))
    }

    /// Purges the state past the provided block and notifies the pending transaction manager, in
    /// one transaction.
    pub(crate) async fn reset_state(&self, block_number: u64) -> SynchronizerResult<()> {
        tracing::debug!(target: "rollup::sync::reorg", block_number, "reverting synchronization");
        let mut tx = self.processor.state().begin().await?;

        if let Err(err) = tx.reset(block_number).await {
            tracing::error!(target: "rollup::sync::reorg", %err, "failed to reset the state");
            return Err(rollback(tx, err.into()).await);
        }
        if let Err(err) = self.tx_manager.reorg(block_number + 1, &mut tx).await {
            tracing::error!(target: "rollup::sync::reorg", %err, "failed to process reorg on the pending transactions");
            return Err(rollback(tx, err.into()).await);
        }

        tx.commit().await?;
        Ok(())
    }
}
