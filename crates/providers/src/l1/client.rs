use super::{ChainGateway, GasPricer, L1ProviderError, L1ReceiptInfo, L1TransactionInfo};

use alloy_network::{Ethereum, Network, TransactionResponse};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{
    BlockId, BlockNumberOrTag, Filter, Log, TransactionInput, TransactionRequest,
    TransactionTrait,
};
use rollup_sync_primitives::L1BlockHeader;

/// The Ethereum L1 block response.
type Block = <Ethereum as Network>::BlockResponse;

/// An implementation of the [`ChainGateway`] over an alloy [`Provider`].
///
/// The provider should implement some backoff strategy using
/// [`alloy_transport::layers::RetryBackoffLayer`] in order to absorb transient RPC failures.
#[derive(Debug, Clone)]
pub struct L1RpcGateway<P> {
    provider: P,
}

impl<P> L1RpcGateway<P> {
    /// Returns a new [`L1RpcGateway`] from the provided provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns a reference to the inner provider.
    pub const fn inner(&self) -> &P {
        &self.provider
    }
}

fn header(block: Block) -> L1BlockHeader {
    L1BlockHeader {
        number: block.header.number,
        hash: block.header.hash,
        parent_hash: block.header.parent_hash,
        received_at: block.header.timestamp,
    }
}

#[async_trait::async_trait]
impl<P: Provider<Ethereum>> ChainGateway for L1RpcGateway<P> {
    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, L1ProviderError> {
        Ok(self.provider.get_logs(filter).await?)
    }

    async fn block_by_number(&self, number: u64) -> Result<L1BlockHeader, L1ProviderError> {
        self.provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await?
            .map(header)
            .ok_or(L1ProviderError::NotFound)
    }

    async fn block_by_hash(&self, hash: B256) -> Result<L1BlockHeader, L1ProviderError> {
        self.provider.get_block_by_hash(hash).await?.map(header).ok_or(L1ProviderError::NotFound)
    }

    async fn latest_header(&self) -> Result<L1BlockHeader, L1ProviderError> {
        self.provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .map(header)
            .ok_or(L1ProviderError::NotFound)
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<L1TransactionInfo, L1ProviderError> {
        let tx =
            self.provider.get_transaction_by_hash(hash).await?.ok_or(L1ProviderError::NotFound)?;
        let block_number = tx.block_number().ok_or(L1ProviderError::PendingTransaction(hash))?;

        Ok(L1TransactionInfo {
            hash: tx.tx_hash(),
            from: tx.from(),
            nonce: tx.nonce(),
            input: tx.input().clone(),
            block_number: Some(block_number),
        })
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<L1ReceiptInfo>, L1ProviderError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| L1ReceiptInfo {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            block_hash: receipt.block_hash,
            status: receipt.status(),
            gas_used: receipt.gas_used,
        }))
    }

    async fn code_at(&self, address: Address, block: u64) -> Result<Bytes, L1ProviderError> {
        Ok(self.provider.get_code_at(address).block_id(BlockId::number(block)).await?)
    }

    async fn call(
        &self,
        to: Address,
        data: Bytes,
        block: Option<u64>,
    ) -> Result<Bytes, L1ProviderError> {
        let request = TransactionRequest {
            to: Some(to.into()),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        let block = block.map(BlockId::number).unwrap_or_else(BlockId::latest);
        Ok(self.provider.call(request).block(block).await?)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, L1ProviderError> {
        Ok(self.provider.estimate_gas(tx).await?)
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<B256, L1ProviderError> {
        let pending = self.provider.send_raw_transaction(&encoded).await?;
        tracing::debug!(target: "rollup::providers", hash = ?pending.tx_hash(), "sent transaction");
        Ok(*pending.tx_hash())
    }

    async fn nonce_at(&self, address: Address) -> Result<u64, L1ProviderError> {
        Ok(self.provider.get_transaction_count(address).await?)
    }
}

#[async_trait::async_trait]
impl<P: Provider<Ethereum>> GasPricer for L1RpcGateway<P> {
    async fn gas_price(&self) -> Result<u128, L1ProviderError> {
        Ok(self.provider.get_gas_price().await?)
    }
}
