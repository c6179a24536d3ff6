use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;
use std::fmt;

use crate::crypto::Address;

pub mod builder;
mod encoding;
mod params;

pub use encoding::*;
pub use params::SuggestedParams;

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_empty_bytes(value: &ByteBuf) -> bool {
    value.is_empty()
}

// Encode an integer argument the way application calls expect it
pub fn encode_uint64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

// Decode an 8-byte big-endian integer argument
pub fn decode_uint64(bytes: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

// All transaction kinds this crate builds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransactionType {
    #[default]
    Payment,
    ApplicationCall,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "pay",
            Self::ApplicationCall => "appl",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "pay" => Ok(Self::Payment),
            "appl" => Ok(Self::ApplicationCall),
            other => Err(SerdeError::custom(format!(
                "unsupported transaction type {}",
                other
            ))),
        }
    }
}

// What happens to the application after the call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OnComplete {
    #[default]
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
}

impl OnComplete {
    pub fn is_noop(&self) -> bool {
        *self == Self::NoOp
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Self::NoOp => 0,
            Self::OptIn => 1,
            Self::CloseOut => 2,
            Self::ClearState => 3,
            Self::UpdateApplication => 4,
            Self::DeleteApplication => 5,
        }
    }
}

impl TryFrom<u64> for OnComplete {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::NoOp,
            1 => Self::OptIn,
            2 => Self::CloseOut,
            3 => Self::ClearState,
            4 => Self::UpdateApplication,
            5 => Self::DeleteApplication,
            other => return Err(format!("unknown on-complete value {}", other)),
        })
    }
}

impl Serialize for OnComplete {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_u64())
    }
}

impl<'de> Deserialize<'de> for OnComplete {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        Self::try_from(value).map_err(SerdeError::custom)
    }
}

/// Storage schema reserved by an application.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StateSchema {
    #[serde(rename = "nbs", skip_serializing_if = "is_zero")]
    pub num_byte_slices: u64,
    #[serde(rename = "nui", skip_serializing_if = "is_zero")]
    pub num_uints: u64,
}

impl StateSchema {
    pub fn new(num_uints: u64, num_byte_slices: u64) -> Self {
        Self {
            num_byte_slices,
            num_uints,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_byte_slices == 0 && self.num_uints == 0
    }
}

/// Reference slot carried by an application call.
///
/// An `app_index` of 0 means the called application itself. A slot with an
/// empty name names no box and only adds 1 KiB to the call's I/O budget.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BoxReference {
    #[serde(rename = "i", skip_serializing_if = "is_zero")]
    pub app_index: u64,
    #[serde(rename = "n", skip_serializing_if = "is_empty_bytes")]
    pub name: ByteBuf,
}

impl BoxReference {
    pub fn new(app_index: u64, name: &[u8]) -> Self {
        Self {
            app_index,
            name: ByteBuf::from(name),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.app_index == 0 && self.name.is_empty()
    }
}

/// Ledger transaction in its wire layout.
///
/// Field names are the canonical short keys, declared in sorted order so the
/// msgpack encoding is canonical. Zero and empty values are omitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Transaction {
    #[serde(rename = "amt", skip_serializing_if = "is_zero")]
    pub amount: u64,
    #[serde(rename = "apaa", skip_serializing_if = "Vec::is_empty")]
    pub app_args: Vec<ByteBuf>,
    #[serde(rename = "apan", skip_serializing_if = "OnComplete::is_noop")]
    pub on_complete: OnComplete,
    #[serde(
        rename = "apap",
        with = "serde_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub approval_program: Option<Vec<u8>>,
    #[serde(rename = "apas", skip_serializing_if = "Vec::is_empty")]
    pub foreign_assets: Vec<u64>,
    #[serde(rename = "apat", skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<Address>,
    #[serde(rename = "apbx", skip_serializing_if = "Vec::is_empty")]
    pub boxes: Vec<BoxReference>,
    #[serde(rename = "apfa", skip_serializing_if = "Vec::is_empty")]
    pub foreign_apps: Vec<u64>,
    #[serde(rename = "apgs", skip_serializing_if = "Option::is_none")]
    pub global_schema: Option<StateSchema>,
    #[serde(rename = "apid", skip_serializing_if = "is_zero")]
    pub app_id: u64,
    #[serde(rename = "apls", skip_serializing_if = "Option::is_none")]
    pub local_schema: Option<StateSchema>,
    #[serde(
        rename = "apsu",
        with = "serde_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub clear_program: Option<Vec<u8>>,
    #[serde(rename = "fee", skip_serializing_if = "is_zero")]
    pub fee: u64,
    #[serde(rename = "fv", skip_serializing_if = "is_zero")]
    pub first_valid: u64,
    #[serde(rename = "gen", skip_serializing_if = "String::is_empty")]
    pub genesis_id: String,
    #[serde(rename = "gh", skip_serializing_if = "is_empty_bytes")]
    pub genesis_hash: ByteBuf,
    #[serde(
        rename = "grp",
        with = "serde_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<Vec<u8>>,
    #[serde(rename = "lv", skip_serializing_if = "is_zero")]
    pub last_valid: u64,
    #[serde(
        rename = "note",
        with = "serde_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<Vec<u8>>,
    #[serde(rename = "rcv", skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Address>,
    #[serde(rename = "snd")]
    pub sender: Address,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
}

impl Transaction {
    pub fn is_app_creation(&self) -> bool {
        self.tx_type == TransactionType::ApplicationCall && self.app_id == 0
    }

    // Application arguments as plain byte slices
    pub fn args(&self) -> impl Iterator<Item = &[u8]> {
        self.app_args.iter().map(|arg| arg.as_slice())
    }
}

/// Transaction together with the ed25519 signature of its sender.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    #[serde(with = "serde_bytes")]
    pub sig: Vec<u8>,
    pub txn: Transaction,
}
