use super::{ChainGateway, L1ProviderError, L1ReceiptInfo};

use alloy_primitives::{Address, B256};
use alloy_rpc_types_eth::Filter;
use alloy_sol_types::{SolCall, SolEvent};
use rollup_sync_l1::abi::{
    calls::{
        getLastGlobalExitRootCall, lastBatchSequencedCall, lastVerifiedBatchCall,
        trustedSequencerCall, trustedSequencerURLCall,
    },
    logs::UpdateZkEVMVersion,
};
use rollup_sync_primitives::ForkIdInterval;
use std::time::Duration;

/// The interval at which a submitted transaction is polled for its receipt.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Provides typed access to the rollup contracts, on top of a [`ChainGateway`].
#[async_trait::async_trait]
pub trait RollupContractProvider {
    /// Checks the rollup contract was deployed at exactly the provided genesis block: code must
    /// exist at the block and not at the previous one. A node missing the state for the previous
    /// block counts as a pass.
    async fn verify_gen_block_number(
        &self,
        rollup: Address,
        gen_block_number: u64,
    ) -> Result<bool, L1ProviderError>;

    /// Returns the fork intervals announced by the contracts.
    async fn forks(&self, addresses: Vec<Address>) -> Result<Vec<ForkIdInterval>, L1ProviderError>;

    /// Returns the last batch number sequenced on the rollup contract.
    async fn latest_batch_number(&self, rollup: Address) -> Result<u64, L1ProviderError>;

    /// Returns the last batch number verified on the rollup contract.
    async fn latest_verified_batch_number(&self, rollup: Address) -> Result<u64, L1ProviderError>;

    /// Returns the address of the trusted sequencer.
    async fn trusted_sequencer(&self, rollup: Address) -> Result<Address, L1ProviderError>;

    /// Returns the URL of the trusted sequencer.
    async fn trusted_sequencer_url(&self, rollup: Address) -> Result<String, L1ProviderError>;

    /// Returns the last global exit root of the manager at the provided block.
    async fn last_global_exit_root(
        &self,
        manager: Address,
        block: u64,
    ) -> Result<B256, L1ProviderError>;

    /// Returns the receipt of the transaction if it was mined.
    async fn check_tx_was_mined(
        &self,
        hash: B256,
    ) -> Result<Option<L1ReceiptInfo>, L1ProviderError>;

    /// Waits for the transaction to be mined, returning false if the timeout elapses first.
    async fn wait_tx_to_be_mined(
        &self,
        hash: B256,
        timeout: Duration,
    ) -> Result<bool, L1ProviderError>;
}

async fn view<G: ChainGateway + ?Sized, C: SolCall + Send>(
    gateway: &G,
    to: Address,
    call: C,
    block: Option<u64>,
) -> Result<C::Return, L1ProviderError> {
    let data = gateway.call(to, call.abi_encode().into(), block).await?;
    Ok(C::abi_decode_returns(&data)?)
}

#[async_trait::async_trait]
impl<G: ChainGateway> RollupContractProvider for G {
    async fn verify_gen_block_number(
        &self,
        rollup: Address,
        gen_block_number: u64,
    ) -> Result<bool, L1ProviderError> {
        let code = self.code_at(rollup, gen_block_number).await?;
        if code.is_empty() {
            return Ok(false);
        }

        match self.code_at(rollup, gen_block_number.saturating_sub(1)).await {
            Ok(code) => Ok(code.is_empty()),
            Err(L1ProviderError::MissingTrieNode) => Ok(true),
            Err(err) => {
                tracing::error!(target: "rollup::providers", ?err, gen_block_number, "failed to fetch rollup code");
                Err(err)
            }
        }
    }

    async fn forks(&self, addresses: Vec<Address>) -> Result<Vec<ForkIdInterval>, L1ProviderError> {
        let filter = Filter::new()
            .from_block(1)
            .address(addresses)
            .event_signature(UpdateZkEVMVersion::SIGNATURE_HASH);
        let logs = self.filter_logs(&filter).await?;

        let mut forks: Vec<ForkIdInterval> = Vec::with_capacity(logs.len());
        for log in logs {
            let update = UpdateZkEVMVersion::decode_log(&log.inner)?.data;
            if let Some(previous) = forks.last_mut() {
                previous.to_batch_number = update.numBatch.saturating_sub(1);
            }
            forks.push(ForkIdInterval {
                from_batch_number: update.numBatch,
                to_batch_number: u64::MAX,
                fork_id: update.forkID,
                version: update.version,
            });
        }

        tracing::debug!(target: "rollup::providers", ?forks, "decoded forks");
        Ok(forks)
    }

    async fn latest_batch_number(&self, rollup: Address) -> Result<u64, L1ProviderError> {
        view(self, rollup, lastBatchSequencedCall {}, None).await
    }

    async fn latest_verified_batch_number(&self, rollup: Address) -> Result<u64, L1ProviderError> {
        view(self, rollup, lastVerifiedBatchCall {}, None).await
    }

    async fn trusted_sequencer(&self, rollup: Address) -> Result<Address, L1ProviderError> {
        view(self, rollup, trustedSequencerCall {}, None).await
    }

    async fn trusted_sequencer_url(&self, rollup: Address) -> Result<String, L1ProviderError> {
        view(self, rollup, trustedSequencerURLCall {}, None).await
    }

    async fn last_global_exit_root(
        &self,
        manager: Address,
        block: u64,
    ) -> Result<B256, L1ProviderError> {
        view(self, manager, getLastGlobalExitRootCall {}, Some(block)).await
    }

    async fn check_tx_was_mined(
        &self,
        hash: B256,
    ) -> Result<Option<L1ReceiptInfo>, L1ProviderError> {
        match self.transaction_receipt(hash).await {
            Err(L1ProviderError::NotFound) => Ok(None),
            res => res,
        }
    }

    async fn wait_tx_to_be_mined(
        &self,
        hash: B256,
        timeout: Duration,
    ) -> Result<bool, L1ProviderError> {
        let wait = async {
            loop {
                if self.check_tx_was_mined(hash).await?.is_some() {
                    return Ok::<_, L1ProviderError>(());
                }
                tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(res) => res.map(|_| true),
            Err(_) => {
                tracing::debug!(target: "rollup::providers", ?hash, ?timeout, "transaction not mined in time");
                Ok(false)
            }
        }
    }
}
