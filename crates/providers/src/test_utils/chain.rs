use super::{chain, chain_from};
use crate::{ChainGateway, GasPricer, L1ProviderError, L1ReceiptInfo, L1TransactionInfo};

use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_rpc_types_eth::{Filter, Log, TransactionRequest};
use alloy_transport::TransportErrorKind;
use parking_lot::Mutex;
use rollup_sync_primitives::L1BlockHeader;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

#[derive(Debug, Default)]
struct ChainState {
    headers: BTreeMap<u64, L1BlockHeader>,
    logs: Vec<Log>,
    transactions: HashMap<B256, L1TransactionInfo>,
    pending: HashSet<B256>,
    receipts: HashMap<B256, L1ReceiptInfo>,
    code: HashMap<Address, (u64, Bytes)>,
    calls: HashMap<(Address, [u8; 4]), Bytes>,
    pruned_below: Option<u64>,
    failing_log_queries: usize,
    log_queries: usize,
    gas_price: u128,
    sent: Vec<Bytes>,
}

/// An in-memory base chain implementing the [`ChainGateway`].
///
/// Logs are attached to the current header at their block number and are dropped when the block
/// is reorged.
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    /// Returns a [`MockChain`] with `len` random linked headers, numbered from zero.
    pub fn with_chain(len: usize) -> Self {
        let mock = Self::default();
        mock.state.lock().headers = chain(len).into_iter().map(|h| (h.number, h)).collect();
        mock
    }

    /// Returns the header at the provided number.
    pub fn header(&self, number: u64) -> Option<L1BlockHeader> {
        self.state.lock().headers.get(&number).copied()
    }

    /// Returns the current head of the chain.
    pub fn head(&self) -> Option<L1BlockHeader> {
        self.state.lock().headers.last_key_value().map(|(_, h)| *h)
    }

    /// Extends the chain by `len` random headers.
    pub fn extend(&self, len: usize) {
        let mut state = self.state.lock();
        let Some(head) = state.headers.last_key_value().map(|(_, h)| *h) else { return };
        for header in chain_from(&head, len) {
            state.headers.insert(header.number, header);
        }
    }

    /// Replaces every header from `number` to the head with new random headers and drops the
    /// logs they contained.
    pub fn reorg_from(&self, number: u64) {
        let mut state = self.state.lock();
        let Some(head) = state.headers.last_key_value().map(|(n, _)| *n) else { return };
        let Some(parent) = state.headers.get(&number.saturating_sub(1)).copied() else { return };

        for header in chain_from(&parent, (head + 1 - number) as usize) {
            state.headers.insert(header.number, header);
        }
        state.logs.retain(|log| log.block_number.is_some_and(|n| n < number));
    }

    /// Attaches the log to the block at the provided number, emitted by a random transaction.
    pub fn push_log(&self, block_number: u64, inner: alloy_primitives::Log) -> Log {
        self.push_log_with_tx(block_number, inner, B256::random())
    }

    /// Attaches the log to the block at the provided number, emitted by the provided transaction.
    pub fn push_log_with_tx(
        &self,
        block_number: u64,
        inner: alloy_primitives::Log,
        transaction_hash: B256,
    ) -> Log {
        let mut state = self.state.lock();
        let hash = state.headers.get(&block_number).map(|h| h.hash);
        let log_index = state.logs.iter().filter(|l| l.block_number == Some(block_number)).count();
        let log = Log {
            inner,
            block_hash: hash,
            block_number: Some(block_number),
            transaction_hash: Some(transaction_hash),
            log_index: Some(log_index as u64),
            ..Default::default()
        };

        state.logs.push(log.clone());
        state.logs.sort_by_key(|l| (l.block_number, l.log_index));
        log
    }

    /// Inserts the mined transaction.
    pub fn insert_transaction(&self, tx: L1TransactionInfo) {
        self.state.lock().transactions.insert(tx.hash, tx);
    }

    /// Inserts the transaction as pending.
    pub fn insert_pending_transaction(&self, hash: B256) {
        self.state.lock().pending.insert(hash);
    }

    /// Sets the receipt for its transaction.
    pub fn set_receipt(&self, receipt: L1ReceiptInfo) {
        self.state.lock().receipts.insert(receipt.transaction_hash, receipt);
    }

    /// Deploys the code at the address from the provided block onward.
    pub fn set_code(&self, address: Address, from_block: u64, code: Bytes) {
        self.state.lock().code.insert(address, (from_block, code));
    }

    /// Makes state queries below the provided block fail as on a pruned node.
    pub fn set_pruned_below(&self, block: u64) {
        self.state.lock().pruned_below = Some(block);
    }

    /// Sets the returned data for calls to the selector of the address.
    pub fn set_call_result(&self, address: Address, selector: [u8; 4], result: Bytes) {
        self.state.lock().calls.insert((address, selector), result);
    }

    /// Sets the quoted gas price.
    pub fn set_gas_price(&self, price: u128) {
        self.state.lock().gas_price = price;
    }

    /// Makes the next `count` log queries fail.
    pub fn fail_next_log_queries(&self, count: usize) {
        self.state.lock().failing_log_queries = count;
    }

    /// Returns the count of log queries served.
    pub fn log_queries(&self) -> usize {
        self.state.lock().log_queries
    }

    /// Returns the raw transactions submitted to the chain.
    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.state.lock().sent.clone()
    }
}

fn rpc_error(msg: &str) -> L1ProviderError {
    L1ProviderError::Rpc(TransportErrorKind::custom_str(msg))
}

#[async_trait::async_trait]
impl ChainGateway for MockChain {
    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, L1ProviderError> {
        let mut state = self.state.lock();
        if state.failing_log_queries > 0 {
            state.failing_log_queries -= 1;
            return Err(rpc_error("log query failed"));
        }
        state.log_queries += 1;

        let from = filter.get_from_block().unwrap_or_default();
        let to = filter.get_to_block().unwrap_or(u64::MAX);
        Ok(state
            .logs
            .iter()
            .filter(|log| log.block_number.is_some_and(|n| n >= from && n <= to))
            .filter(|log| filter.address.matches(&log.address()))
            .filter(|log| {
                filter.topics[0].is_empty() ||
                    log.topic0().is_some_and(|topic| filter.topics[0].matches(topic))
            })
            .cloned()
            .collect())
    }

    async fn block_by_number(&self, number: u64) -> Result<L1BlockHeader, L1ProviderError> {
        self.header(number).ok_or(L1ProviderError::NotFound)
    }

    async fn block_by_hash(&self, hash: B256) -> Result<L1BlockHeader, L1ProviderError> {
        self.state
            .lock()
            .headers
            .values()
            .find(|h| h.hash == hash)
            .copied()
            .ok_or(L1ProviderError::NotFound)
    }

    async fn latest_header(&self) -> Result<L1BlockHeader, L1ProviderError> {
        self.head().ok_or(L1ProviderError::NotFound)
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<L1TransactionInfo, L1ProviderError> {
        let state = self.state.lock();
        if state.pending.contains(&hash) {
            return Err(L1ProviderError::PendingTransaction(hash));
        }
        state.transactions.get(&hash).cloned().ok_or(L1ProviderError::NotFound)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<L1ReceiptInfo>, L1ProviderError> {
        Ok(self.state.lock().receipts.get(&hash).copied())
    }

    async fn code_at(&self, address: Address, block: u64) -> Result<Bytes, L1ProviderError> {
        let state = self.state.lock();
        if state.pruned_below.is_some_and(|pruned| block < pruned) {
            return Err(L1ProviderError::MissingTrieNode);
        }
        Ok(state
            .code
            .get(&address)
            .filter(|(deployed_at, _)| *deployed_at <= block)
            .map(|(_, code)| code.clone())
            .unwrap_or_default())
    }

    async fn call(
        &self,
        to: Address,
        data: Bytes,
        _block: Option<u64>,
    ) -> Result<Bytes, L1ProviderError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| rpc_error("missing selector"))?;
        self.state
            .lock()
            .calls
            .get(&(to, selector))
            .cloned()
            .ok_or_else(|| rpc_error("execution reverted"))
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> Result<u64, L1ProviderError> {
        Ok(21_000)
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<B256, L1ProviderError> {
        let hash = keccak256(&encoded);
        self.state.lock().sent.push(encoded);
        Ok(hash)
    }

    async fn nonce_at(&self, address: Address) -> Result<u64, L1ProviderError> {
        Ok(self.state.lock().transactions.values().filter(|tx| tx.from == address).count() as u64)
    }
}

#[async_trait::async_trait]
impl GasPricer for MockChain {
    async fn gas_price(&self) -> Result<u128, L1ProviderError> {
        Ok(self.state.lock().gas_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::LogData;

    #[tokio::test]
    async fn test_should_filter_logs_by_range_and_address() -> eyre::Result<()> {
        // Given
        let chain = MockChain::with_chain(10);
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let topic = B256::repeat_byte(3);
        for (block, address) in [(2, a), (4, b), (6, a), (8, a)] {
            let data = LogData::new_unchecked(vec![topic], Bytes::new());
            chain.push_log(block, alloy_primitives::Log { address, data });
        }

        // When
        let filter = Filter::new().from_block(3).to_block(8).address(a);
        let logs = chain.filter_logs(&filter).await?;

        // Then
        let blocks: Vec<_> = logs.iter().filter_map(|l| l.block_number).collect();
        assert_eq!(blocks, vec![6, 8]);

        Ok(())
    }

    #[tokio::test]
    async fn test_should_relink_headers_on_reorg() -> eyre::Result<()> {
        // Given
        let chain = MockChain::with_chain(6);
        let before = chain.header(3).unwrap();
        chain.push_log(4, alloy_primitives::Log::empty());

        // When
        chain.reorg_from(3);

        // Then
        let after = chain.header(3).unwrap();
        assert_ne!(before.hash, after.hash);
        assert_eq!(after.parent_hash, chain.header(2).unwrap().hash);
        assert_eq!(chain.header(5).unwrap().parent_hash, chain.header(4).unwrap().hash);
        assert!(chain.filter_logs(&Filter::new()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_should_inject_log_query_failures() {
        let chain = MockChain::with_chain(2);
        chain.fail_next_log_queries(1);

        assert!(chain.filter_logs(&Filter::new()).await.is_err());
        assert!(chain.filter_logs(&Filter::new()).await.is_ok());
        assert_eq!(chain.log_queries(), 1);
    }
}
