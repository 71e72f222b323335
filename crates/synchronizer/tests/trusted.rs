//! Tests for the reconciliation of the trusted state.

mod common;
use common::{exit_root, payload, spawn, wait_until, Harness, L2_TIMESTAMP, TRUSTED_URL};

use alloy_primitives::{Address, Bytes, B256};
use rollup_sync_providers::{TrustedBatch, TrustedTransaction};
use rollup_sync_state::{
    codec,
    test_utils::executor::{local_exit_root, next_state_root},
    Batch,
};

const TRUSTED_SEQUENCER: Address = Address::repeat_byte(0x5e);

fn transactions(data: &Bytes) -> eyre::Result<Vec<TrustedTransaction>> {
    Ok(codec::decode_transactions(data)?
        .iter()
        .map(|tx| TrustedTransaction { encoded: codec::encode_transactions([tx]) })
        .collect())
}

/// Returns the trusted batch matching the local one.
fn trusted_from_local(batch: &Batch) -> eyre::Result<TrustedBatch> {
    Ok(TrustedBatch {
        batch_number: batch.batch_number,
        global_exit_root: batch.global_exit_root,
        local_exit_root: batch.local_exit_root,
        state_root: batch.state_root,
        sequencer: batch.coinbase,
        timestamp: batch.timestamp,
        transactions: transactions(&batch.batch_l2_data)?,
    })
}

/// Returns a trusted batch on top of the provided state root, closed if `closed` is set.
fn trusted_batch(
    batch_number: u64,
    previous_root: B256,
    data: &Bytes,
    closed: bool,
) -> eyre::Result<TrustedBatch> {
    let timestamp = L2_TIMESTAMP + batch_number;
    let state_root = if closed {
        next_state_root(previous_root, batch_number, data, exit_root(), timestamp)
    } else {
        B256::ZERO
    };
    Ok(TrustedBatch {
        batch_number,
        global_exit_root: exit_root(),
        local_exit_root: if closed { local_exit_root(state_root) } else { B256::ZERO },
        state_root,
        sequencer: TRUSTED_SEQUENCER,
        timestamp,
        transactions: transactions(data)?,
    })
}

fn harness() -> Harness {
    let mut harness = Harness::new(150);
    harness.config.is_trusted_sequencer = false;
    harness
}

#[tokio::test]
async fn test_should_reconcile_trusted_batches() -> eyre::Result<()> {
    // Given
    let harness = harness();
    harness.push_scenario();
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    let synced = wait_until(&harness.state, |data| data.virtual_batches.contains_key(&2)).await?;

    // When
    let data3 = payload(&[3]);
    let data4 = payload(&[4, 5]);
    let trusted3 = trusted_batch(3, synced.batches[&2].state_root, &data3, true)?;
    harness.broadcast.push_batch(trusted_from_local(&synced.batches[&2])?);
    harness.broadcast.push_batch(trusted3.clone());
    harness.broadcast.push_batch(trusted_batch(4, trusted3.state_root, &data4, false)?);
    let data = wait_until(&harness.state, |data| data.batches.contains_key(&4)).await?;

    // Then
    let batch3 = &data.batches[&3];
    assert!(batch3.closed);
    assert_eq!(batch3.state_root, trusted3.state_root);
    assert_eq!(batch3.local_exit_root, trusted3.local_exit_root);
    assert_eq!(batch3.coinbase, TRUSTED_SEQUENCER);
    assert_eq!(batch3.batch_l2_data, data3);
    assert_eq!(data.transactions[&3].len(), 1);

    let batch4 = &data.batches[&4];
    assert!(!batch4.closed);
    assert!(batch4.state_root.is_zero());
    assert_eq!(data.transactions[&4].len(), 2);

    // the sequenced batch matched and was left untouched.
    assert_eq!(data.batches[&2], synced.batches[&2]);
    assert!(!data.transactions.contains_key(&2));
    assert!(!data.virtual_batches.contains_key(&3));
    assert!(harness.broadcast.connections().iter().all(|url| url == TRUSTED_URL));

    // When
    harness.broadcast.push_batch(trusted_batch(4, trusted3.state_root, &data4, true)?);
    let data = wait_until(&harness.state, |data| data.batches[&4].closed).await?;
    handle.stop();
    task.await??;

    // Then
    let expected = next_state_root(trusted3.state_root, 4, &data4, exit_root(), L2_TIMESTAMP + 4);
    assert_eq!(data.batches[&4].state_root, expected);
    assert_eq!(data.batches[&3], batch3.clone());

    Ok(())
}

#[tokio::test]
async fn test_should_replace_diverging_trusted_batch() -> eyre::Result<()> {
    // Given
    let harness = harness();
    harness.push_scenario();
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    let synced = wait_until(&harness.state, |data| data.virtual_batches.contains_key(&2)).await?;
    let root2 = synced.batches[&2].state_root;
    harness.broadcast.push_batch(trusted_from_local(&synced.batches[&2])?);
    harness.broadcast.push_batch(trusted_batch(3, root2, &payload(&[3]), false)?);
    wait_until(&harness.state, |data| data.batches.contains_key(&3)).await?;

    // When
    let replacement = payload(&[6, 7, 8]);
    harness.broadcast.push_batch(trusted_batch(3, root2, &replacement, true)?);
    let data = wait_until(&harness.state, |data| data.batches[&3].closed).await?;
    handle.stop();
    task.await??;

    // Then
    assert_eq!(data.batches[&3].batch_l2_data, replacement);
    assert_eq!(data.transactions[&3].len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_should_skip_reconciliation_while_behind() -> eyre::Result<()> {
    // Given
    let harness = harness();
    harness.push_scenario();
    harness.set_last_sequenced_batch(3);
    harness.broadcast.push_batch(trusted_batch(3, B256::ZERO, &payload(&[3]), false)?);
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();

    // When
    let task = spawn(synchronizer);
    wait_until(&harness.state, |data| common::last_block(data) == 150).await?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    handle.stop();
    task.await??;

    // Then
    assert!(harness.broadcast.connections().is_empty());
    assert!(!harness.state.snapshot().await.batches.contains_key(&3));

    Ok(())
}

#[tokio::test]
async fn test_should_survive_broadcast_failures() -> eyre::Result<()> {
    // Given
    let harness = harness();
    harness.push_scenario();
    harness.broadcast.set_failing(true);
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    let synced = wait_until(&harness.state, |data| common::last_block(data) == 150).await?;

    // When
    harness.broadcast.push_batch(trusted_from_local(&synced.batches[&2])?);
    harness
        .broadcast
        .push_batch(trusted_batch(3, synced.batches[&2].state_root, &payload(&[3]), true)?);
    harness.broadcast.set_failing(false);
    let data = wait_until(&harness.state, |data| data.batches.contains_key(&3)).await?;
    handle.stop();
    task.await??;

    // Then
    assert!(data.batches[&3].closed);
    assert!(harness.broadcast.connections().len() > 1);

    Ok(())
}
