//! Interfaces to the persistent state of the rollup synchronizer.
//!
//! The synchronizer only interacts with the state through transactions. Every write happens in a
//! [`StateTransaction`] that is committed or rolled back as a whole.

pub mod codec;

mod error;
pub use error::{StateError, StateResult};

mod models;
pub use models::{
    Batch, Genesis, GenesisAccount, ProcessBatchResponse, ProcessingContext, ProcessingReceipt,
    TransactionResponse, VirtualBatch,
};

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;

use alloy_primitives::{Bytes, B256};
use rollup_sync_primitives::{
    ForcedBatch, GlobalExitRoot, L1BlockHeader, L2BatchInfo, Sequence, VerifiedBatch,
};

/// A transactional store holding the synchronized state.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait StateProvider: Send + Sync {
    /// The transaction type of the store.
    type Tx: StateTransaction;

    /// Begins a new transaction.
    async fn begin(&self) -> StateResult<Self::Tx>;

    /// Returns the last synchronized base chain block.
    async fn get_last_block(&self) -> StateResult<L1BlockHeader>;

    /// Returns the number of the last stored batch.
    async fn get_last_batch_number(&self) -> StateResult<u64>;

    /// Returns the cursor of the last stored batch.
    async fn get_last_batch_info(&self) -> StateResult<L2BatchInfo>;
}

/// A transaction over the synchronized state.
///
/// Dropping a transaction without committing it discards its writes.
#[async_trait::async_trait]
pub trait StateTransaction: Send + Sync + 'static {
    /// Commits the transaction.
    async fn commit(self) -> StateResult<()>;

    /// Rolls back the transaction.
    async fn rollback(self) -> StateResult<()>;

    /// Stores the base chain block.
    async fn add_block(&mut self, block: &L1BlockHeader) -> StateResult<()>;

    /// Returns the last synchronized base chain block, or
    /// [`StateError::StateNotSynchronized`] if no block was stored.
    async fn get_last_block(&self) -> StateResult<L1BlockHeader>;

    /// Returns the stored block `depth` blocks before the last one.
    async fn get_previous_block(&self, depth: u64) -> StateResult<L1BlockHeader>;

    /// Stores the genesis block and the genesis batch, returning the computed genesis state root.
    async fn set_genesis(&mut self, block: &L1BlockHeader, genesis: &Genesis) -> StateResult<B256>;

    /// Purges everything attached to a block past the provided one.
    async fn reset(&mut self, block_number: u64) -> StateResult<()>;

    /// Stores the global exit root.
    async fn add_global_exit_root(&mut self, root: &GlobalExitRoot) -> StateResult<()>;

    /// Stores the forced batch.
    async fn add_forced_batch(&mut self, batch: &ForcedBatch) -> StateResult<()>;

    /// Returns the batch with the provided number.
    async fn get_batch_by_number(&self, batch_number: u64) -> StateResult<Batch>;

    /// Returns the number of the last stored batch.
    async fn get_last_batch_number(&self) -> StateResult<u64>;

    /// Executes the batch without storing it, returning its accumulated input hash.
    async fn execute_batch(&self, batch: &Batch) -> StateResult<B256>;

    /// Executes and stores the batch as closed, returning its state root.
    async fn process_and_store_closed_batch(
        &mut self,
        context: ProcessingContext,
        data: Bytes,
    ) -> StateResult<B256>;

    /// Sets the accumulated input hash of a stored batch.
    async fn add_accumulated_input_hash(
        &mut self,
        batch_number: u64,
        acc_input_hash: B256,
    ) -> StateResult<()>;

    /// Stores the virtual batch.
    async fn add_virtual_batch(&mut self, batch: &VirtualBatch) -> StateResult<()>;

    /// Stores the sequence.
    async fn add_sequence(&mut self, sequence: &Sequence) -> StateResult<()>;

    /// Returns the last verified batch.
    async fn get_last_verified_batch(&self) -> StateResult<VerifiedBatch>;

    /// Stores the verified batch.
    async fn add_verified_batch(&mut self, batch: &VerifiedBatch) -> StateResult<()>;

    /// Purges the batches past the provided one that are not virtualized yet.
    async fn reset_trusted_state(&mut self, batch_number: u64) -> StateResult<()>;

    /// Opens a new batch.
    async fn open_batch(&mut self, context: ProcessingContext) -> StateResult<()>;

    /// Executes the transactions of the open batch.
    async fn process_sequencer_batch(
        &mut self,
        batch_number: u64,
        data: Bytes,
    ) -> StateResult<ProcessBatchResponse>;

    /// Stores the transactions of the batch.
    async fn store_transactions(
        &mut self,
        batch_number: u64,
        responses: &[TransactionResponse],
    ) -> StateResult<()>;

    /// Closes the batch.
    async fn close_batch(&mut self, receipt: ProcessingReceipt) -> StateResult<()>;
}

/// Tracks the transactions submitted to the base chain by the node.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait PendingTxManager<Tx: Send>: Send + Sync {
    /// Marks every transaction mined past the provided block for re-submission.
    async fn reorg(&self, from_block: u64, tx: &mut Tx) -> StateResult<()>;
}
