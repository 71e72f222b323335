//! Batch payload codec.
//!
//! A batch payload is the concatenation of the EIP-2718 encoding of its transactions.

use crate::error::StateResult;
use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::{Decodable2718, Encodable2718};
use alloy_primitives::Bytes;

/// Decodes the transactions of a batch payload.
pub fn decode_transactions(mut data: &[u8]) -> StateResult<Vec<TxEnvelope>> {
    let mut txs = Vec::new();
    while !data.is_empty() {
        txs.push(TxEnvelope::decode_2718(&mut data)?);
    }
    Ok(txs)
}

/// Decodes a single network encoded transaction, failing on trailing bytes.
pub fn decode_transaction(data: &[u8]) -> StateResult<TxEnvelope> {
    Ok(TxEnvelope::decode_2718_exact(data)?)
}

/// Encodes the transactions into a batch payload.
pub fn encode_transactions<'a>(txs: impl IntoIterator<Item = &'a TxEnvelope>) -> Bytes {
    let mut out = Vec::new();
    for tx in txs {
        tx.encode_2718(&mut out);
    }
    out.into()
}
