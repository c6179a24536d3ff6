//! JSON bodies returned by the ledger node REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CompileResponse {
    pub hash: String,
    // base64 of the compiled program
    pub result: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    #[serde(default)]
    pub consensus_version: String,
    // fee per byte
    pub fee: u64,
    // base64
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PostTransactionsResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
    #[serde(default)]
    pub time_since_last_round: u64,
    #[serde(default)]
    pub catchup_time: u64,
}

/// Pending or confirmed transaction record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<u64>,
    #[serde(default)]
    pub pool_error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_rewards: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_state_delta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
    #[serde(default)]
    pub txn: Value,
}

impl PendingTransactionResponse {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.unwrap_or(0) > 0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInformation {
    pub address: String,
    pub amount: u64,
    pub min_balance: u64,
    #[serde(default)]
    pub total_boxes: u64,
    #[serde(default)]
    pub total_box_bytes: u64,
    #[serde(default)]
    pub round: u64,
}

/// Raw global state entry: base64 key and tagged value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TealKeyValue {
    pub key: String,
    pub value: TealValue,
}

/// Tag 1 means bytes (base64 in `bytes`), any other tag means `uint`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct TealValue {
    #[serde(rename = "type")]
    pub value_type: u64,
    #[serde(default)]
    pub bytes: String,
    #[serde(default)]
    pub uint: u64,
}

pub const TEAL_BYTES_TYPE: u64 = 1;
pub const TEAL_UINT_TYPE: u64 = 2;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationParams {
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub global_state: Vec<TealKeyValue>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Application {
    pub id: u64,
    pub params: ApplicationParams,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BoxResponse {
    // base64
    pub name: String,
    #[serde(default)]
    pub round: Option<u64>,
    // base64
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BoxDescriptor {
    // base64
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct BoxesResponse {
    #[serde(default)]
    pub boxes: Vec<BoxDescriptor>,
}

// Error body returned by the node on non-2xx responses
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}
