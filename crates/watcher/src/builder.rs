//! Accumulates the blocks and event orders produced by one scan.

use crate::error::{WatcherError, WatcherResult};
use alloy_primitives::B256;
use rollup_sync_primitives::{
    EventKind, GlobalExitRoot, L1Block, L1BlockHeader, Order, RollupInfo, SequencedBatch,
    VerifiedBatch,
};
use std::collections::HashMap;

/// Builds a [`RollupInfo`] from events pushed in arrival order.
///
/// Events are appended to the last block if it is the block they were emitted in, otherwise a new
/// block is opened.
#[derive(Debug, Default)]
pub(crate) struct RollupInfoBuilder {
    blocks: Vec<L1Block>,
    order: HashMap<B256, Vec<Order>>,
}

impl RollupInfoBuilder {
    /// Returns the header of the last block if it has the provided number and hash.
    pub(crate) fn tip_matching(&self, number: u64, hash: B256) -> Option<L1BlockHeader> {
        self.tip().filter(|tip| tip.number == number && tip.hash == hash)
    }

    /// Returns the header of the last block if it has the provided number. Errors if the number is
    /// lower than the last block's.
    pub(crate) fn tip_at(&self, number: u64) -> WatcherResult<Option<L1BlockHeader>> {
        match self.tip() {
            Some(tip) if tip.number == number => Ok(Some(tip)),
            Some(tip) if number < tip.number => {
                Err(WatcherError::InconsistentBlockOrder { previous: tip.number, current: number })
            }
            _ => Ok(None),
        }
    }

    fn tip(&self) -> Option<L1BlockHeader> {
        self.blocks.last().map(|block| block.header)
    }

    fn block_for(&mut self, header: L1BlockHeader) -> &mut L1Block {
        if !self.blocks.last().is_some_and(|block| block.header.matches(&header)) {
            self.blocks.push(L1Block::new(header));
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    fn record(&mut self, hash: B256, kind: EventKind, position: usize) {
        self.order.entry(hash).or_default().push(Order::new(kind, position));
    }

    pub(crate) fn push_global_exit_root(&mut self, header: L1BlockHeader, root: GlobalExitRoot) {
        let block = self.block_for(header);
        block.global_exit_roots.push(root);
        let position = block.global_exit_roots.len() - 1;
        self.record(header.hash, EventKind::GlobalExitRoots, position);
    }

    /// Pushes a group of batches sequenced together. A single order entry is recorded for the
    /// group.
    pub(crate) fn push_sequenced_batches(
        &mut self,
        header: L1BlockHeader,
        batches: Vec<SequencedBatch>,
    ) {
        let block = self.block_for(header);
        block.sequenced_batches.push(batches);
        let position = block.sequenced_batches.len() - 1;
        self.record(header.hash, EventKind::SequenceBatches, position);
    }

    pub(crate) fn push_verified_batch(&mut self, header: L1BlockHeader, batch: VerifiedBatch) {
        let block = self.block_for(header);
        block.verified_batches.push(batch);
        let position = block.verified_batches.len() - 1;
        self.record(header.hash, EventKind::TrustedVerifyBatch, position);
    }

    pub(crate) fn build(self) -> RollupInfo {
        RollupInfo { blocks: self.blocks, order: self.order }
    }
}
