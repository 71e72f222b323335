use super::executor::{
    accumulated_input_hash, genesis_root, local_exit_root, next_state_root, transaction_root,
};
use crate::{
    codec, Batch, Genesis, ProcessBatchResponse, ProcessingContext, ProcessingReceipt,
    StateError, StateProvider, StateResult, StateTransaction, TransactionResponse, VirtualBatch,
};

use alloy_primitives::{Bytes, B256};
use parking_lot::Mutex as SyncMutex;
use rollup_sync_primitives::{
    ForcedBatch, GlobalExitRoot, L1BlockHeader, L2BatchInfo, Sequence, VerifiedBatch,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// The operations of the [`InMemoryState`] that support failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateOp {
    /// [`StateProvider::begin`].
    Begin,
    /// [`StateTransaction::commit`].
    Commit,
    /// [`StateTransaction::rollback`].
    Rollback,
    /// [`StateTransaction::add_block`].
    AddBlock,
    /// [`StateTransaction::reset`].
    Reset,
    /// [`StateTransaction::execute_batch`].
    ExecuteBatch,
    /// [`StateTransaction::add_verified_batch`].
    AddVerifiedBatch,
    /// [`StateTransaction::process_sequencer_batch`].
    ProcessSequencerBatch,
}

type Faults = Arc<SyncMutex<HashMap<StateOp, usize>>>;

fn check(faults: &Faults, op: StateOp) -> StateResult<()> {
    let mut faults = faults.lock();
    match faults.get_mut(&op) {
        Some(count) if *count > 0 => {
            *count -= 1;
            Err(StateError::Storage(format!("injected failure for {op:?}")))
        }
        _ => Ok(()),
    }
}

/// The data held by the [`InMemoryState`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StateData {
    /// The synchronized base chain blocks.
    pub blocks: BTreeMap<u64, L1BlockHeader>,
    /// The global exit roots in insertion order.
    pub global_exit_roots: Vec<GlobalExitRoot>,
    /// The forced batches in insertion order.
    pub forced_batches: Vec<ForcedBatch>,
    /// The batches.
    pub batches: BTreeMap<u64, Batch>,
    /// The virtual batches.
    pub virtual_batches: BTreeMap<u64, VirtualBatch>,
    /// The verified batches.
    pub verified_batches: BTreeMap<u64, VerifiedBatch>,
    /// The sequences in insertion order.
    pub sequences: Vec<Sequence>,
    /// The transactions stored for each batch.
    pub transactions: BTreeMap<u64, Vec<TransactionResponse>>,
}

impl StateData {
    fn last_block(&self) -> StateResult<L1BlockHeader> {
        self.blocks.last_key_value().map(|(_, b)| *b).ok_or(StateError::StateNotSynchronized)
    }

    fn last_batch_number(&self) -> u64 {
        self.batches.last_key_value().map(|(n, _)| *n).unwrap_or_default()
    }

    fn batch(&self, batch_number: u64) -> StateResult<&Batch> {
        self.batches.get(&batch_number).ok_or(StateError::NotFound)
    }

    fn previous_batch(&self, batch_number: u64) -> StateResult<&Batch> {
        self.batch(batch_number.checked_sub(1).ok_or(StateError::NotFound)?)
    }

    fn batch_info(&self) -> L2BatchInfo {
        let Some((number, batch)) = self.batches.last_key_value() else {
            return L2BatchInfo::default();
        };
        let l1_block =
            self.virtual_batches.get(number).map(|vb| vb.block_number).unwrap_or_default();
        L2BatchInfo::new(*number, l1_block, batch.timestamp)
    }
}

/// A transactional in-memory store.
///
/// Transactions are serialized: [`StateProvider::begin`] waits for the previous transaction to be
/// committed, rolled back or dropped. Reads outside a transaction wait as well.
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    data: Arc<Mutex<StateData>>,
    faults: Faults,
}

impl InMemoryState {
    /// Returns a copy of the committed data.
    pub async fn snapshot(&self) -> StateData {
        self.data.lock().await.clone()
    }

    /// Makes the next `count` calls to the operation fail.
    pub fn fail_next(&self, op: StateOp, count: usize) {
        self.faults.lock().insert(op, count);
    }
}

#[async_trait::async_trait]
impl StateProvider for InMemoryState {
    type Tx = InMemoryTx;

    async fn begin(&self) -> StateResult<Self::Tx> {
        check(&self.faults, StateOp::Begin)?;
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryTx { guard, working, faults: self.faults.clone() })
    }

    async fn get_last_block(&self) -> StateResult<L1BlockHeader> {
        self.data.lock().await.last_block()
    }

    async fn get_last_batch_number(&self) -> StateResult<u64> {
        Ok(self.data.lock().await.last_batch_number())
    }

    async fn get_last_batch_info(&self) -> StateResult<L2BatchInfo> {
        Ok(self.data.lock().await.batch_info())
    }
}

/// A transaction of the [`InMemoryState`].
///
/// Writes go to a working copy which replaces the committed data on commit.
#[derive(Debug)]
pub struct InMemoryTx {
    guard: OwnedMutexGuard<StateData>,
    working: StateData,
    faults: Faults,
}

#[async_trait::async_trait]
impl StateTransaction for InMemoryTx {
    async fn commit(mut self) -> StateResult<()> {
        tracing::trace!(target: "rollup::state", "Committing transaction");
        check(&self.faults, StateOp::Commit)?;
        *self.guard = self.working;
        Ok(())
    }

    async fn rollback(self) -> StateResult<()> {
        tracing::trace!(target: "rollup::state", "Rolling back transaction");
        check(&self.faults, StateOp::Rollback)
    }

    async fn add_block(&mut self, block: &L1BlockHeader) -> StateResult<()> {
        check(&self.faults, StateOp::AddBlock)?;
        self.working.blocks.insert(block.number, *block);
        Ok(())
    }

    async fn get_last_block(&self) -> StateResult<L1BlockHeader> {
        self.working.last_block()
    }

    async fn get_previous_block(&self, depth: u64) -> StateResult<L1BlockHeader> {
        let depth = usize::try_from(depth).map_err(|_| StateError::NotFound)?;
        self.working.blocks.values().rev().nth(depth).copied().ok_or(StateError::NotFound)
    }

    async fn set_genesis(&mut self, block: &L1BlockHeader, genesis: &Genesis) -> StateResult<B256> {
        let root = genesis_root(genesis);
        self.add_block(block).await?;
        self.working.batches.insert(
            0,
            Batch {
                state_root: root,
                local_exit_root: local_exit_root(root),
                timestamp: block.received_at,
                closed: true,
                ..Default::default()
            },
        );
        self.working
            .virtual_batches
            .insert(0, VirtualBatch { block_number: block.number, ..Default::default() });
        self.working.verified_batches.insert(
            0,
            VerifiedBatch {
                block_number: block.number,
                state_root: root,
                is_trusted: true,
                ..Default::default()
            },
        );
        Ok(root)
    }

    async fn reset(&mut self, block_number: u64) -> StateResult<()> {
        check(&self.faults, StateOp::Reset)?;
        let data = &mut self.working;
        data.blocks.retain(|n, _| *n <= block_number);
        data.global_exit_roots.retain(|r| r.block_number <= block_number);
        data.forced_batches.retain(|b| b.block_number <= block_number);
        data.virtual_batches.retain(|_, b| b.block_number <= block_number);
        data.verified_batches.retain(|_, b| b.block_number <= block_number);

        let virtual_batches = &data.virtual_batches;
        data.sequences.retain(|s| virtual_batches.contains_key(&s.to_batch_number));
        Ok(())
    }

    async fn add_global_exit_root(&mut self, root: &GlobalExitRoot) -> StateResult<()> {
        self.working.global_exit_roots.push(*root);
        Ok(())
    }

    async fn add_forced_batch(&mut self, batch: &ForcedBatch) -> StateResult<()> {
        self.working.forced_batches.push(batch.clone());
        Ok(())
    }

    async fn get_batch_by_number(&self, batch_number: u64) -> StateResult<Batch> {
        self.working.batch(batch_number).cloned()
    }

    async fn get_last_batch_number(&self) -> StateResult<u64> {
        Ok(self.working.last_batch_number())
    }

    async fn execute_batch(&self, batch: &Batch) -> StateResult<B256> {
        check(&self.faults, StateOp::ExecuteBatch).map_err(|err| StateError::Execution {
            batch_number: batch.batch_number,
            reason: err.to_string(),
        })?;
        let previous = self.working.previous_batch(batch.batch_number)?;
        Ok(accumulated_input_hash(
            previous.acc_input_hash,
            &batch.batch_l2_data,
            batch.global_exit_root,
            batch.timestamp,
            batch.coinbase,
        ))
    }

    async fn process_and_store_closed_batch(
        &mut self,
        context: ProcessingContext,
        data: Bytes,
    ) -> StateResult<B256> {
        let previous = self.working.previous_batch(context.batch_number)?;
        let state_root = next_state_root(
            previous.state_root,
            context.batch_number,
            &data,
            context.global_exit_root,
            context.timestamp,
        );
        let acc_input_hash = accumulated_input_hash(
            previous.acc_input_hash,
            &data,
            context.global_exit_root,
            context.timestamp,
            context.coinbase,
        );

        self.working.batches.insert(
            context.batch_number,
            Batch {
                batch_number: context.batch_number,
                coinbase: context.coinbase,
                batch_l2_data: data,
                state_root,
                local_exit_root: local_exit_root(state_root),
                acc_input_hash,
                global_exit_root: context.global_exit_root,
                timestamp: context.timestamp,
                closed: true,
            },
        );
        Ok(state_root)
    }

    async fn add_accumulated_input_hash(
        &mut self,
        batch_number: u64,
        acc_input_hash: B256,
    ) -> StateResult<()> {
        let batch = self.working.batches.get_mut(&batch_number).ok_or(StateError::NotFound)?;
        batch.acc_input_hash = acc_input_hash;
        Ok(())
    }

    async fn add_virtual_batch(&mut self, batch: &VirtualBatch) -> StateResult<()> {
        self.working.batch(batch.batch_number)?;
        self.working.virtual_batches.insert(batch.batch_number, *batch);
        Ok(())
    }

    async fn add_sequence(&mut self, sequence: &Sequence) -> StateResult<()> {
        self.working.sequences.push(*sequence);
        Ok(())
    }

    async fn get_last_verified_batch(&self) -> StateResult<VerifiedBatch> {
        self.working
            .verified_batches
            .last_key_value()
            .map(|(_, b)| *b)
            .ok_or(StateError::NotFound)
    }

    async fn add_verified_batch(&mut self, batch: &VerifiedBatch) -> StateResult<()> {
        check(&self.faults, StateOp::AddVerifiedBatch)?;
        self.working.verified_batches.insert(batch.batch_number, *batch);
        Ok(())
    }

    async fn reset_trusted_state(&mut self, batch_number: u64) -> StateResult<()> {
        let data = &mut self.working;
        let trusted: Vec<_> = data
            .batches
            .range(batch_number.saturating_add(1)..)
            .map(|(n, _)| *n)
            .filter(|n| !data.virtual_batches.contains_key(n))
            .collect();
        for n in trusted {
            data.batches.remove(&n);
            data.transactions.remove(&n);
        }
        Ok(())
    }

    async fn open_batch(&mut self, context: ProcessingContext) -> StateResult<()> {
        if self.working.batches.contains_key(&context.batch_number) {
            return Err(StateError::Storage(format!(
                "batch {} already exists",
                context.batch_number
            )));
        }
        if !self.working.previous_batch(context.batch_number)?.closed {
            return Err(StateError::Storage(format!(
                "previous batch of {} is still open",
                context.batch_number
            )));
        }

        self.working.batches.insert(
            context.batch_number,
            Batch {
                batch_number: context.batch_number,
                coinbase: context.coinbase,
                global_exit_root: context.global_exit_root,
                timestamp: context.timestamp,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn process_sequencer_batch(
        &mut self,
        batch_number: u64,
        data: Bytes,
    ) -> StateResult<ProcessBatchResponse> {
        check(&self.faults, StateOp::ProcessSequencerBatch).map_err(|err| {
            StateError::Execution { batch_number, reason: err.to_string() }
        })?;
        let previous = self.working.previous_batch(batch_number)?.clone();
        let batch = self.working.batches.get_mut(&batch_number).ok_or(StateError::NotFound)?;
        if batch.closed {
            return Err(StateError::Storage(format!("batch {batch_number} is closed")));
        }

        let mut root = previous.state_root;
        let mut responses = Vec::new();
        for tx in codec::decode_transactions(&data)? {
            let tx_hash = *tx.tx_hash();
            root = transaction_root(root, tx_hash);
            responses.push(TransactionResponse {
                tx_hash,
                encoded: codec::encode_transactions([&tx]),
                state_root: root,
            });
        }

        let new_state_root = next_state_root(
            previous.state_root,
            batch_number,
            &data,
            batch.global_exit_root,
            batch.timestamp,
        );
        let new_acc_input_hash = accumulated_input_hash(
            previous.acc_input_hash,
            &data,
            batch.global_exit_root,
            batch.timestamp,
            batch.coinbase,
        );
        batch.batch_l2_data = data;
        batch.acc_input_hash = new_acc_input_hash;

        Ok(ProcessBatchResponse {
            new_state_root,
            new_local_exit_root: local_exit_root(new_state_root),
            new_acc_input_hash,
            responses,
        })
    }

    async fn store_transactions(
        &mut self,
        batch_number: u64,
        responses: &[TransactionResponse],
    ) -> StateResult<()> {
        self.working.batch(batch_number)?;
        self.working.transactions.insert(batch_number, responses.to_vec());
        Ok(())
    }

    async fn close_batch(&mut self, receipt: ProcessingReceipt) -> StateResult<()> {
        let batch =
            self.working.batches.get_mut(&receipt.batch_number).ok_or(StateError::NotFound)?;
        if batch.closed {
            return Err(StateError::Storage(format!("batch {} is closed", receipt.batch_number)));
        }
        batch.state_root = receipt.state_root;
        batch.local_exit_root = receipt.local_exit_root;
        batch.closed = true;
        Ok(())
    }
}
