use alloy_primitives::{Address, Bytes, B256};

/// An L2 batch made visible by a sequencing event or by the preconfirmation feed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct SequencedBatch {
    /// The batch number.
    pub batch_number: u64,
    /// The base chain block number the batch is anchored at.
    pub block_number: u64,
    /// The address of the sequencer. Zero for preconfirmed batches.
    pub sequencer: Address,
    /// The hash of the sequencing transaction. Zero for preconfirmed batches.
    pub tx_hash: B256,
    /// The nonce of the sequencing transaction. Zero for preconfirmed batches.
    pub nonce: u64,
    /// The coinbase of the batch. Zero for preconfirmed batches.
    pub coinbase: Address,
    /// The raw L2 transactions of the batch.
    pub transactions: Bytes,
    /// The global exit root active for the batch.
    pub global_exit_root: B256,
    /// The batch timestamp.
    pub timestamp: u64,
}

/// A batch certified by a trusted verification event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct VerifiedBatch {
    /// The base chain block number of the verification.
    pub block_number: u64,
    /// The batch number. A verification certifies every batch up to and including this one.
    pub batch_number: u64,
    /// The address of the aggregator.
    pub aggregator: Address,
    /// The hash of the verification transaction.
    pub tx_hash: B256,
    /// The state root after the batch.
    pub state_root: B256,
    /// Whether the verification came from the trusted aggregator.
    pub is_trusted: bool,
}

/// A batch forced through the legacy input channel.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct ForcedBatch {
    /// The base chain block number of the forced batch.
    pub block_number: u64,
    /// The forced batch number.
    pub forced_batch_number: u64,
    /// The address forcing the batch.
    pub sequencer: Address,
    /// The global exit root at the time the batch was forced.
    pub global_exit_root: B256,
    /// The raw L2 transactions.
    pub raw_txs_data: Bytes,
    /// The timestamp at which the batch was forced.
    pub forced_at: u64,
}

/// The rolling watermark of the last processed L2 batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("L2BatchInfo {{ number: {number}, l1_block: {l1_block}, timestamp: {timestamp} }}")]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct L2BatchInfo {
    /// The batch number.
    pub number: u64,
    /// The base chain block number the batch is anchored at.
    pub l1_block: u64,
    /// The batch timestamp.
    pub timestamp: u64,
}

impl L2BatchInfo {
    /// Returns a new [`L2BatchInfo`].
    pub const fn new(number: u64, l1_block: u64, timestamp: u64) -> Self {
        Self { number, l1_block, timestamp }
    }

    /// Returns the number of the batch expected after this one.
    pub const fn next_number(&self) -> u64 {
        self.number + 1
    }
}

/// A contiguous range of batches sequenced together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Sequence {
    /// The first batch of the sequence.
    pub from_batch_number: u64,
    /// The last batch of the sequence.
    pub to_batch_number: u64,
}

impl Sequence {
    /// Returns the [`Sequence`] covering the provided batches, if any.
    pub fn from_batches(batches: &[SequencedBatch]) -> Option<Self> {
        Some(Self {
            from_batch_number: batches.first()?.batch_number,
            to_batch_number: batches.last()?.batch_number,
        })
    }
}
