use algobox_common::{state::StateError, transaction::TransactionError};
use thiserror::Error;

use crate::ledger_api::LedgerError;

/// Precondition violations detected before anything is sent to the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Box name must be between {min} and {max} bytes, got {len}")]
    InvalidBoxName { len: usize, min: usize, max: usize },
    #[error("Exceeded {max} reference slots in a transaction: {needed} needed")]
    SlotLimitExceeded { needed: u64, max: usize },
    #[error("Too many foreign references in a transaction: {count} (max {max})")]
    TooManyReferences { count: usize, max: usize },
    #[error("Too many application arguments: {count} (max {max})")]
    TooManyArgs { count: usize, max: usize },
    #[error("Application arguments are too large: {len} bytes (max {max})")]
    ArgsTooLarge { len: usize, max: usize },
    #[error("End position exceeds size of the box: data of {len} bytes for a box of {box_len} bytes")]
    DataTooLong { len: u64, box_len: u64 },
    #[error("Extract data length is too long: {len} bytes for a box of {box_len} bytes")]
    ExtractTooLong { len: u64, box_len: u64 },
    #[error("Start position {start} exceeds size of the box ({box_len} bytes)")]
    StartOutOfRange { start: u64, box_len: u64 },
}

#[derive(Debug, Error)]
pub enum BoxError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Transaction rejected: {0}")]
    SubmissionFailed(String),
    #[error("Transaction {tx_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout { tx_id: String, rounds: u64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Ledger(LedgerError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("Cannot read artifact {path}: {source}")]
    Artifact {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Confirmed transaction {0} carries no application index")]
    MissingApplicationIndex(String),
}

impl From<LedgerError> for BoxError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(what) => Self::NotFound(what),
            LedgerError::Rejected(reason) => Self::SubmissionFailed(reason),
            other => Self::Ledger(other),
        }
    }
}

impl BoxError {
    // Outcome is unknown: the transaction may still be confirmed later
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }
}
