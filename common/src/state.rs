//! Decoding of an application's raw global key/value state.

use base64::{engine::general_purpose::STANDARD, Engine};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::api::{TealKeyValue, TEAL_BYTES_TYPE};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid base64 in global state {field}: {reason}")]
    InvalidBase64 { field: &'static str, reason: String },
}

/// Decoded global state value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum GlobalValue {
    Bytes(String),
    Uint(u64),
}

impl GlobalValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(value) => Some(*value),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Bytes(value) => Some(value),
            Self::Uint(_) => None,
        }
    }
}

impl fmt::Display for GlobalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(value) => write!(f, "{:?}", value),
            Self::Uint(value) => write!(f, "{}", value),
        }
    }
}

/// Global state keyed by UTF-8 key, in the order the ledger returned it.
pub type GlobalState = IndexMap<String, GlobalValue>;

fn decode_text(field: &'static str, encoded: &str) -> Result<String, StateError> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| StateError::InvalidBase64 {
            field,
            reason: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Convert raw global state entries into a typed mapping.
pub fn decode_global_state(entries: &[TealKeyValue]) -> Result<GlobalState, StateError> {
    let mut state = GlobalState::with_capacity(entries.len());
    for entry in entries {
        let key = decode_text("key", &entry.key)?;
        let value = if entry.value.value_type == TEAL_BYTES_TYPE {
            GlobalValue::Bytes(decode_text("value", &entry.value.bytes)?)
        } else {
            GlobalValue::Uint(entry.value.uint)
        };
        state.insert(key, value);
    }
    Ok(state)
}
