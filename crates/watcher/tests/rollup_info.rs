use alloy_primitives::{Address, Bytes, Log, LogData, B256, U256};
use alloy_sol_types::SolEvent;
use rollup_sync_l1::abi::logs::{
    NewBlocks, UpdateGlobalExitRoot, VerifyBatches, VerifyBatchesTrustedAggregator,
};
use rollup_sync_primitives::{BlockEvent, GlobalExitRoot, L2BatchInfo};
use rollup_sync_providers::{
    test_utils::{MockAvailability, MockChain},
    L1ProviderError, L1TransactionInfo,
};
use rollup_sync_watcher::WatcherError;

mod common;
use common::*;

fn exit_root_log(mainnet: u8, rollup: u8) -> Log {
    let event = UpdateGlobalExitRoot {
        mainnetExitRoot: B256::repeat_byte(mainnet),
        rollupExitRoot: B256::repeat_byte(rollup),
    };
    Log { address: MANAGER, data: event.encode_log_data() }
}

fn verify_log(num_batch: u64, state_root: u8) -> Log {
    let event = VerifyBatchesTrustedAggregator {
        numBatch: num_batch,
        stateRoot: B256::repeat_byte(state_root),
        aggregator: Address::repeat_byte(0xaa),
    };
    Log { address: ROLLUP, data: event.encode_log_data() }
}

fn new_blocks_log(first: u64, count: u64) -> Log {
    let event = NewBlocks { firstBlockNumber: U256::from(first), numBlocks: U256::from(count) };
    Log { address: HOTSHOT, data: event.encode_log_data() }
}

/// Inserts the transaction emitting a new blocks event and returns its hash.
fn sequencing_tx(chain: &MockChain, block: u64) -> L1TransactionInfo {
    let tx = L1TransactionInfo {
        hash: B256::repeat_byte(0x5e),
        from: Address::repeat_byte(0x5e),
        nonce: 7,
        input: Bytes::new(),
        block_number: Some(block),
    };
    chain.insert_transaction(tx.clone());
    tx
}

#[tokio::test]
async fn test_should_replay_events_in_emission_order() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    chain.push_log(3, exit_root_log(1, 2));
    chain.push_log(3, verify_log(1, 0x11));
    chain.push_log(3, exit_root_log(3, 4));
    chain.push_log(5, verify_log(2, 0x22));
    let watcher = watcher(&chain, &availability);

    // When
    let info = watcher
        .get_rollup_info_by_block_range(0, Some(9), L2BatchInfo::default(), true)
        .await?;

    // Then
    let numbers: Vec<_> = info.blocks.iter().map(|b| b.number()).collect();
    assert_eq!(numbers, vec![3, 5]);
    assert_eq!(info.blocks[0].header, chain.header(3).unwrap());

    let first = GlobalExitRoot::new(3, B256::repeat_byte(1), B256::repeat_byte(2));
    let second = GlobalExitRoot::new(3, B256::repeat_byte(3), B256::repeat_byte(4));
    let events: Vec<_> = info.events(&info.blocks[0]).map(Option::unwrap).collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], BlockEvent::GlobalExitRoot(&first));
    assert!(matches!(
        events[1],
        BlockEvent::TrustedVerifyBatch(v) if v.batch_number == 1 && v.block_number == 3
    ));
    assert_eq!(events[2], BlockEvent::GlobalExitRoot(&second));

    let verified = &info.blocks[1].verified_batches;
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].state_root, B256::repeat_byte(0x22));
    assert_eq!(verified[0].aggregator, Address::repeat_byte(0xaa));

    Ok(())
}

#[tokio::test]
async fn test_should_only_return_logs_in_range() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    for block in [2, 4, 6, 8] {
        chain.push_log(block, exit_root_log(block as u8, 0));
    }
    let watcher = watcher(&chain, &availability);

    // When
    let bounded = watcher
        .get_rollup_info_by_block_range(3, Some(6), L2BatchInfo::default(), true)
        .await?;
    let open = watcher.get_rollup_info_by_block_range(5, None, L2BatchInfo::default(), true).await?;

    // Then
    let numbers = |info: &rollup_sync_primitives::RollupInfo| {
        info.blocks.iter().map(|b| b.number()).collect::<Vec<_>>()
    };
    assert_eq!(numbers(&bounded), vec![4, 6]);
    assert_eq!(numbers(&open), vec![6, 8]);

    Ok(())
}

#[tokio::test]
async fn test_should_fetch_batches_of_new_blocks_event() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    let root = B256::repeat_byte(0x42);
    deploy_manager(&chain, 0, root);
    availability.push_block(sequencer_block(101, 2, 1_000, "0x0102"));
    availability.push_block(sequencer_block(102, 3, 1_010, "0x"));
    let tx = sequencing_tx(&chain, 6);
    chain.push_log_with_tx(6, new_blocks_log(101, 2), tx.hash);
    let watcher = watcher(&chain, &availability);

    // When
    let info = watcher
        .get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), false)
        .await?;

    // Then
    assert_eq!(info.blocks.len(), 1);
    let block = &info.blocks[0];
    assert_eq!(block.number(), 6);
    assert_eq!(block.sequenced_batches.len(), 1);

    let batches = &block.sequenced_batches[0];
    let numbers: Vec<_> = batches.iter().map(|b| b.batch_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(batches[0].transactions, Bytes::from(vec![1, 2]));
    assert_eq!(batches[0].block_number, 2);
    assert_eq!(batches[0].global_exit_root, root);
    assert_eq!(batches[0].sequencer, tx.from);
    assert_eq!(batches[0].nonce, 7);
    assert_eq!(batches[1].timestamp, 1_010);
    assert!(batches[1].transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_should_ignore_new_blocks_when_using_preconfirmations() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    availability.push_block(sequencer_block(101, 2, 1_000, "0x"));
    let tx = sequencing_tx(&chain, 6);
    chain.push_log_with_tx(6, new_blocks_log(101, 1), tx.hash);
    let watcher = watcher(&chain, &availability);

    // When
    let info = watcher.get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), true).await?;

    // Then
    assert!(info.is_empty());
    assert_eq!(availability.requests(101), 0);

    Ok(())
}

#[tokio::test]
async fn test_should_skip_blocks_up_to_genesis() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    deploy_manager(&chain, 0, B256::ZERO);
    availability.push_block(sequencer_block(101, 2, 1_000, "0x"));
    let tx = sequencing_tx(&chain, 6);
    chain.push_log_with_tx(6, new_blocks_log(99, 3), tx.hash);
    let watcher = watcher(&chain, &availability);

    // When
    let info = watcher
        .get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), false)
        .await?;

    // Then
    assert_eq!(availability.requests(99), 0);
    assert_eq!(availability.requests(100), 0);
    let batches = &info.blocks[0].sequenced_batches[0];
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].batch_number, 1);

    Ok(())
}

#[tokio::test]
async fn test_should_skip_already_processed_batches() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    deploy_manager(&chain, 0, B256::ZERO);
    availability.push_block(sequencer_block(101, 2, 1_000, "0x"));
    availability.push_block(sequencer_block(102, 2, 1_000, "0x"));
    let tx = sequencing_tx(&chain, 6);
    chain.push_log_with_tx(6, new_blocks_log(101, 2), tx.hash);
    let watcher = watcher(&chain, &availability);

    // When
    let cursor = L2BatchInfo::new(1, 2, 1_000);
    let info = watcher.get_rollup_info_by_block_range(0, None, cursor, false).await?;

    // Then
    let batches = &info.blocks[0].sequenced_batches[0];
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].batch_number, 2);

    Ok(())
}

#[tokio::test]
async fn test_should_drop_group_when_every_batch_is_skipped() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    availability.push_block(sequencer_block(101, 2, 1_000, "0x"));
    let tx = sequencing_tx(&chain, 6);
    chain.push_log_with_tx(6, new_blocks_log(101, 1), tx.hash);
    let watcher = watcher(&chain, &availability);

    // When
    let cursor = L2BatchInfo::new(1, 2, 1_000);
    let info = watcher.get_rollup_info_by_block_range(0, None, cursor, false).await?;

    // Then
    assert!(info.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_should_fail_on_batch_gap() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    deploy_manager(&chain, 0, B256::ZERO);
    availability.push_block(sequencer_block(103, 2, 1_000, "0x"));
    let tx = sequencing_tx(&chain, 6);
    chain.push_log_with_tx(6, new_blocks_log(103, 1), tx.hash);
    let watcher = watcher(&chain, &availability);

    // When
    let result = watcher
        .get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), false)
        .await;

    // Then
    let err = result.unwrap_err();
    assert!(matches!(err, WatcherError::BatchGap { batch_number: 3, expected: 1 }));
    assert!(err.is_unrecoverable());

    Ok(())
}

#[tokio::test]
async fn test_should_fail_on_pending_sequencing_transaction() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    let hash = B256::repeat_byte(0x77);
    chain.insert_pending_transaction(hash);
    chain.push_log_with_tx(6, new_blocks_log(101, 1), hash);
    let watcher = watcher(&chain, &availability);

    // When
    let result = watcher
        .get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), false)
        .await;

    // Then
    assert!(matches!(
        result,
        Err(WatcherError::L1Provider(L1ProviderError::PendingTransaction(h))) if h == hash
    ));

    Ok(())
}

#[tokio::test]
async fn test_should_ignore_unknown_and_unimplemented_events() -> eyre::Result<()> {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    let unknown = LogData::new_unchecked(vec![B256::repeat_byte(0xee)], Bytes::new());
    chain.push_log(2, Log { address: ROLLUP, data: unknown });
    let verify = VerifyBatches {
        numBatch: 1,
        stateRoot: B256::repeat_byte(1),
        aggregator: Address::repeat_byte(2),
    };
    chain.push_log(3, Log { address: ROLLUP, data: verify.encode_log_data() });
    let watcher = watcher(&chain, &availability);

    // When
    let info = watcher.get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), true).await?;

    // Then
    assert!(info.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_should_surface_log_query_failures() {
    // Given
    let chain = MockChain::with_chain(10);
    let availability = MockAvailability::default();
    chain.fail_next_log_queries(1);
    let watcher = watcher(&chain, &availability);

    // When
    let result = watcher
        .get_rollup_info_by_block_range(0, None, L2BatchInfo::default(), true)
        .await;

    // Then
    assert!(matches!(result, Err(WatcherError::L1Provider(L1ProviderError::Rpc(_)))));
}
