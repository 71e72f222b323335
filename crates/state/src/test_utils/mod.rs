//! Test helpers for the state: an in-memory store backed by a deterministic executor and a mock
//! pending transaction manager.

pub mod executor;

mod memory;
pub use memory::{InMemoryState, InMemoryTx, StateData, StateOp};

use crate::{PendingTxManager, StateError, StateResult};
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_primitives::{Address, Signature, TxKind, U256};
use parking_lot::Mutex;
use std::sync::Arc;

/// Returns a signed legacy transfer with the provided nonce.
pub fn transfer(nonce: u64) -> TxEnvelope {
    let tx = TxLegacy {
        nonce,
        gas_price: 1_000_000_000,
        gas_limit: 21_000,
        to: TxKind::Call(Address::repeat_byte(1)),
        value: U256::from(1),
        ..Default::default()
    };
    tx.into_signed(Signature::new(U256::from(1), U256::from(2), false)).into()
}

/// A [`PendingTxManager`] recording the reorg notifications it receives.
#[derive(Debug, Clone, Default)]
pub struct MockTxManager {
    reorgs: Arc<Mutex<Vec<u64>>>,
    failing: Arc<Mutex<bool>>,
}

impl MockTxManager {
    /// Returns the blocks of the received reorg notifications.
    pub fn reorgs(&self) -> Vec<u64> {
        self.reorgs.lock().clone()
    }

    /// Makes the notifications fail.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

#[async_trait::async_trait]
impl<Tx: Send + 'static> PendingTxManager<Tx> for MockTxManager {
    async fn reorg(&self, from_block: u64, _tx: &mut Tx) -> StateResult<()> {
        if *self.failing.lock() {
            return Err(StateError::Storage("pending tx manager unavailable".into()));
        }
        self.reorgs.lock().push(from_block);
        Ok(())
    }
}
