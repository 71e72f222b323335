//! Tests for the handling of base chain reorgs.

mod common;
use common::{last_block, spawn, wait_until, Harness};

use rollup_sync::SynchronizerError;

#[tokio::test]
async fn test_should_reset_state_on_reorg() -> eyre::Result<()> {
    // Given
    let harness = Harness::new(150);
    harness.push_scenario();
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    wait_until(&harness.state, |data| last_block(data) == 150).await?;

    // When
    let stale = harness.chain.header(150).unwrap();
    harness.chain.reorg_from(125);
    let live = harness.chain.header(150).unwrap();
    let data = wait_until(&harness.state, |data| data.blocks.get(&150) == Some(&live)).await?;
    handle.stop();
    task.await??;

    // Then
    assert_ne!(stale.hash, live.hash);
    assert_eq!(harness.tx_manager.reorgs(), vec![121]);
    assert_eq!(data.blocks[&120], harness.chain.header(120).unwrap());
    assert_eq!(data.blocks[&130], harness.chain.header(130).unwrap());
    assert!(data.blocks.keys().all(|n| *n <= 120 || *n % 10 == 0));

    // the sequencing happened before the reorged range.
    let virtual_batches: Vec<_> = data.virtual_batches.keys().copied().collect();
    assert_eq!(virtual_batches, vec![0, 1, 2]);
    assert_eq!(data.sequences.len(), 1);

    // the exit root update and the verification were dropped with their blocks.
    assert!(data.global_exit_roots.is_empty());
    let verified: Vec<_> = data.verified_batches.keys().copied().collect();
    assert_eq!(verified, vec![0]);

    Ok(())
}

#[tokio::test]
async fn test_should_ignore_unchanged_chain() -> eyre::Result<()> {
    // Given
    let harness = Harness::new(150);
    harness.push_scenario();
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    wait_until(&harness.state, |data| last_block(data) == 150).await?;

    // When
    harness.chain.extend(10);
    let data = wait_until(&harness.state, |data| last_block(data) == 160).await?;
    handle.stop();
    task.await??;

    // Then
    assert!(harness.tx_manager.reorgs().is_empty());
    assert_eq!(data.blocks[&150], harness.chain.header(150).unwrap());
    assert_eq!(data.global_exit_roots.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_should_reset_state_on_unresolvable_reorg() -> eyre::Result<()> {
    // Given
    let mut harness = Harness::new(150);
    harness.push_scenario();
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    wait_until(&harness.state, |data| last_block(data) == 150).await?;
    handle.stop();
    task.await??;

    // When
    // every stored block is replaced, and the genesis block is no bound for the walk back.
    harness.chain.reorg_from(100);
    harness.config.gen_block_number = 0;
    harness.config.ignore_gen_block_number_check = true;
    let res = harness.synchronizer().sync().await;

    // Then
    let Err(SynchronizerError::UnresolvableReorg { block }) = res else {
        eyre::bail!("expected an unresolvable reorg, got {res:?}")
    };
    assert_eq!(block, 150);
    assert_eq!(harness.tx_manager.reorgs(), vec![1]);

    let data = harness.state.snapshot().await;
    assert!(data.blocks.is_empty());
    assert!(data.virtual_batches.is_empty());
    assert!(data.verified_batches.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_should_keep_state_when_reset_fails() -> eyre::Result<()> {
    // Given
    let harness = Harness::new(150);
    harness.push_scenario();
    let synchronizer = harness.synchronizer();
    let handle = synchronizer.handle();
    let task = spawn(synchronizer);
    let before = wait_until(&harness.state, |data| last_block(data) == 150).await?;
    harness.tx_manager.set_failing(true);

    // When
    harness.chain.reorg_from(145);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // Then
    assert_eq!(harness.state.snapshot().await, before);

    // When
    harness.tx_manager.set_failing(false);
    let live = harness.chain.header(150).unwrap();
    wait_until(&harness.state, |data| data.blocks.get(&150) == Some(&live)).await?;
    handle.stop();
    task.await??;

    // Then
    assert_eq!(harness.tx_manager.reorgs(), vec![141]);

    Ok(())
}
