//! Primitive types for the rollup synchronizer.

pub use batch::{ForcedBatch, L2BatchInfo, Sequence, SequencedBatch, VerifiedBatch};
mod batch;

pub use block::{BlockEvent, L1Block, L1BlockHeader};
mod block;

pub use exit_root::{derive_global_exit_root, GlobalExitRoot};
mod exit_root;

pub use fork::ForkIdInterval;
mod fork;

pub use order::{EventKind, Order, RollupInfo};
mod order;
