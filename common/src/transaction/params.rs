use base64::{engine::general_purpose::STANDARD, Engine};

use super::TransactionError;
use crate::{api::TransactionParams, config::DEFAULT_VALIDITY_WINDOW};

/// Network parameters needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    // Fee per byte of the signed transaction
    pub fee_per_byte: u64,
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: Vec<u8>,
}

impl TryFrom<TransactionParams> for SuggestedParams {
    type Error = TransactionError;

    fn try_from(params: TransactionParams) -> Result<Self, Self::Error> {
        let genesis_hash = STANDARD
            .decode(params.genesis_hash.as_bytes())
            .map_err(|e| TransactionError::InvalidGenesisHash(e.to_string()))?;
        if genesis_hash.len() != 32 {
            return Err(TransactionError::InvalidGenesisHash(format!(
                "expected 32 bytes, got {}",
                genesis_hash.len()
            )));
        }

        Ok(Self {
            fee_per_byte: params.fee,
            min_fee: params.min_fee,
            first_valid: params.last_round,
            last_valid: params.last_round + DEFAULT_VALIDITY_WINDOW,
            genesis_id: params.genesis_id,
            genesis_hash,
        })
    }
}
