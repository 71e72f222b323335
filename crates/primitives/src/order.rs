use crate::{BlockEvent, L1Block};
use alloy_primitives::B256;
use std::collections::HashMap;

/// The kind of event an [`Order`] entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum EventKind {
    /// A global exit root update.
    GlobalExitRoots,
    /// A group of sequenced batches.
    SequenceBatches,
    /// A trusted verification.
    TrustedVerifyBatch,
}

/// The position of an event in its block bucket, recorded in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Order {
    /// The kind of the event.
    pub kind: EventKind,
    /// The index of the event in the bucket of the block for its kind.
    pub position: usize,
}

impl Order {
    /// Returns a new [`Order`].
    pub const fn new(kind: EventKind, position: usize) -> Self {
        Self { kind, position }
    }
}

/// The rollup information collected over a range of base chain blocks.
///
/// Blocks are in increasing block number order. The order entries of a block, keyed by its hash,
/// replay its events in the exact order they were emitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollupInfo {
    /// The blocks carrying rollup events.
    pub blocks: Vec<L1Block>,
    /// The order entries for each block hash.
    pub order: HashMap<B256, Vec<Order>>,
}

impl RollupInfo {
    /// Returns true if no block was collected.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the order entries for the provided block hash.
    pub fn order_of(&self, hash: &B256) -> &[Order] {
        self.order.get(hash).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the events of the block in arrival order. An order entry pointing out of the
    /// block's buckets yields [`None`].
    pub fn events<'a>(
        &'a self,
        block: &'a L1Block,
    ) -> impl Iterator<Item = Option<BlockEvent<'a>>> + 'a {
        self.order_of(&block.hash()).iter().map(|order| block.event(order))
    }

    /// Returns the last block, if any.
    pub fn last_block(&self) -> Option<&L1Block> {
        self.blocks.last()
    }
}
