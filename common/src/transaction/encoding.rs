use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use thiserror::Error;

use super::{SignedTransaction, Transaction};
use crate::{
    config::TX_ID_PREFIX,
    crypto::{group_hash, transaction_hash, Hash},
};

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("msgpack encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("msgpack decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("invalid genesis hash: {0}")]
    InvalidGenesisHash(String),
    #[error("transaction group is empty")]
    EmptyGroup,
}

// Canonical msgpack: structs become maps keyed by field name
pub fn to_msgpack<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TransactionError> {
    Ok(rmp_serde::to_vec_named(value)?)
}

pub fn from_msgpack<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, TransactionError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

#[derive(Serialize)]
struct TxGroup {
    #[serde(rename = "txlist")]
    tx_list: Vec<ByteBuf>,
}

impl Transaction {
    pub fn to_msgpack(&self) -> Result<Vec<u8>, TransactionError> {
        to_msgpack(self)
    }

    // Bytes covered by the sender signature
    pub fn bytes_to_sign(&self) -> Result<Vec<u8>, TransactionError> {
        let encoded = self.to_msgpack()?;
        let mut bytes = Vec::with_capacity(TX_ID_PREFIX.len() + encoded.len());
        bytes.extend_from_slice(TX_ID_PREFIX);
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }

    pub fn raw_id(&self) -> Result<Hash, TransactionError> {
        Ok(transaction_hash(&self.to_msgpack()?))
    }

    /// Transaction identifier as shown by the ledger (base32, no padding).
    pub fn id(&self) -> Result<String, TransactionError> {
        Ok(self.raw_id()?.to_base32())
    }
}

impl SignedTransaction {
    pub fn to_msgpack(&self) -> Result<Vec<u8>, TransactionError> {
        to_msgpack(self)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, TransactionError> {
        from_msgpack(bytes)
    }

    pub fn id(&self) -> Result<String, TransactionError> {
        self.txn.id()
    }
}

/// Compute the group identifier of `transactions` and stamp it on each one.
///
/// A single transaction is left untouched and `None` is returned.
pub fn assign_group_id(transactions: &mut [Transaction]) -> Result<Option<Hash>, TransactionError> {
    if transactions.is_empty() {
        return Err(TransactionError::EmptyGroup);
    }
    if transactions.len() == 1 {
        return Ok(None);
    }

    let mut tx_list = Vec::with_capacity(transactions.len());
    for tx in transactions.iter_mut() {
        // Any previous group id must not leak into the member ids
        tx.group = None;
        tx_list.push(ByteBuf::from(tx.raw_id()?.to_bytes().to_vec()));
    }

    let group_id = group_hash(&to_msgpack(&TxGroup { tx_list })?);
    for tx in transactions.iter_mut() {
        tx.group = Some(group_id.as_bytes().to_vec());
    }
    Ok(Some(group_id))
}
