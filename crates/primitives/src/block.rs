use crate::{EventKind, ForcedBatch, GlobalExitRoot, Order, SequencedBatch, VerifiedBatch};
use alloy_primitives::B256;

/// The header fields of a base chain block the synchronizer keeps track of.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct L1BlockHeader {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The hash of the parent block.
    pub parent_hash: B256,
    /// The block timestamp, in seconds.
    pub received_at: u64,
}

impl L1BlockHeader {
    /// Returns a new [`L1BlockHeader`].
    pub const fn new(number: u64, hash: B256, parent_hash: B256, received_at: u64) -> Self {
        Self { number, hash, parent_hash, received_at }
    }

    /// Returns true if the other header has the same hash and parent hash.
    pub fn matches(&self, other: &Self) -> bool {
        self.hash == other.hash && self.parent_hash == other.parent_hash
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for L1BlockHeader {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        Ok(Self {
            number: u.int_in_range(0..=u32::MAX)? as u64,
            hash: u.arbitrary()?,
            parent_hash: u.arbitrary()?,
            received_at: u.int_in_range(0..=u32::MAX)? as u64,
        })
    }
}

/// A base chain block along with the rollup events it carries, grouped by kind.
///
/// A block without events is a placeholder used to advance the synced cursor over a quiet range.
/// The arrival order of the events is not held by the block itself but by the [`Order`] entries
/// returned alongside it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct L1Block {
    /// The block header.
    pub header: L1BlockHeader,
    /// The global exit root updates emitted in the block.
    pub global_exit_roots: Vec<GlobalExitRoot>,
    /// The forced batches emitted in the block.
    pub forced_batches: Vec<ForcedBatch>,
    /// The groups of sequenced batches, one group per sequencing event.
    pub sequenced_batches: Vec<Vec<SequencedBatch>>,
    /// The trusted verifications emitted in the block.
    pub verified_batches: Vec<VerifiedBatch>,
}

impl L1Block {
    /// Returns a new [`L1Block`] without any event.
    pub const fn new(header: L1BlockHeader) -> Self {
        Self {
            header,
            global_exit_roots: Vec::new(),
            forced_batches: Vec::new(),
            sequenced_batches: Vec::new(),
            verified_batches: Vec::new(),
        }
    }

    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.header.number
    }

    /// Returns the block hash.
    pub const fn hash(&self) -> B256 {
        self.header.hash
    }

    /// Returns true if the block carries no event.
    pub fn is_empty(&self) -> bool {
        self.global_exit_roots.is_empty() &&
            self.forced_batches.is_empty() &&
            self.sequenced_batches.is_empty() &&
            self.verified_batches.is_empty()
    }

    /// Returns the event pointed at by the [`Order`], if the position is in bounds.
    pub fn event(&self, order: &Order) -> Option<BlockEvent<'_>> {
        match order.kind {
            EventKind::GlobalExitRoots => {
                self.global_exit_roots.get(order.position).map(BlockEvent::GlobalExitRoot)
            }
            EventKind::SequenceBatches => self
                .sequenced_batches
                .get(order.position)
                .map(|batches| BlockEvent::SequencedBatches(batches.as_slice())),
            EventKind::TrustedVerifyBatch => {
                self.verified_batches.get(order.position).map(BlockEvent::TrustedVerifyBatch)
            }
        }
    }
}

impl From<L1BlockHeader> for L1Block {
    fn from(value: L1BlockHeader) -> Self {
        Self::new(value)
    }
}

/// A reference to one of the events held by a [`L1Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEvent<'a> {
    /// A global exit root update.
    GlobalExitRoot(&'a GlobalExitRoot),
    /// A group of batches sequenced together.
    SequencedBatches(&'a [SequencedBatch]),
    /// A trusted verification.
    TrustedVerifyBatch(&'a VerifiedBatch),
}
