use std::time::Duration;

use algobox_common::{
    api::*,
    crypto::Address,
    utils::sanitize_node_address,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, trace};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const API_TOKEN_HEADER: &str = "X-Algod-API-Token";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BINARY_CONTENT_TYPE: &str = "application/x-binary";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Invalid node response: {0}")]
    Decode(String),
    #[error("Invalid node configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result of waiting on a submitted transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    Confirmed(PendingTransactionResponse),
    // Not finalized within the budget, may still be confirmed later
    TimedOut { tx_id: String, rounds: u64 },
    Rejected(String),
}

impl ConfirmationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

/// Box name and value, both decoded from base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxContent {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

impl BoxContent {
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn len(&self) -> u64 {
        self.value.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, LedgerError> {
    STANDARD
        .decode(value.as_bytes())
        .map_err(|e| LedgerError::Decode(format!("{}: {}", field, e)))
}

impl TryFrom<BoxResponse> for BoxContent {
    type Error = LedgerError;

    fn try_from(response: BoxResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            name: decode_base64("box name", &response.name)?,
            value: decode_base64("box value", &response.value)?,
        })
    }
}

/// Operations the box manager needs from a ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn compile_program(&self, source: &[u8]) -> Result<CompileResponse, LedgerError>;

    async fn suggested_params(&self) -> Result<TransactionParams, LedgerError>;

    // Submit signed transactions as one atomic group, returns the node's tx id
    async fn submit_raw_group(&self, group: &[Vec<u8>]) -> Result<String, LedgerError>;

    async fn status(&self) -> Result<NodeStatus, LedgerError>;

    // Blocks until a round after `round` has been committed
    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, LedgerError>;

    async fn pending_transaction(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionResponse, LedgerError>;

    /// Poll `tx_id` for at most `max_rounds` rounds.
    async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<ConfirmationOutcome, LedgerError> {
        let start_round = self.status().await?.last_round + 1;
        let mut current_round = start_round;

        while current_round < start_round + max_rounds {
            match self.pending_transaction(tx_id).await {
                Ok(pending) => {
                    if pending.is_confirmed() {
                        return Ok(ConfirmationOutcome::Confirmed(pending));
                    }
                    if !pending.pool_error.is_empty() {
                        return Ok(ConfirmationOutcome::Rejected(pending.pool_error));
                    }
                }
                // the node may not know about it yet
                Err(LedgerError::NotFound(_)) => {
                    if log::log_enabled!(log::Level::Trace) {
                        trace!("{} not yet visible at round {}", tx_id, current_round);
                    }
                }
                Err(e) => return Err(e),
            }

            self.status_after_block(current_round).await?;
            current_round += 1;
        }

        Ok(ConfirmationOutcome::TimedOut {
            tx_id: tx_id.to_owned(),
            rounds: max_rounds,
        })
    }

    async fn account_information(
        &self,
        address: &Address,
    ) -> Result<AccountInformation, LedgerError>;

    async fn application_global_state(&self, app_id: u64)
        -> Result<Vec<TealKeyValue>, LedgerError>;

    async fn box_by_name(&self, app_id: u64, name: &[u8]) -> Result<BoxContent, LedgerError>;

    async fn box_names(&self, app_id: u64) -> Result<Vec<Vec<u8>>, LedgerError>;
}

/// HTTP client for the node REST API.
pub struct AlgodAPI {
    client: Client,
    base_url: String,
}

impl AlgodAPI {
    pub fn new(node_address: &str, token: &str) -> Result<Self, LedgerError> {
        Self::with_timeout(node_address, token, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        node_address: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let base_url = sanitize_node_address(node_address);
        reqwest::Url::parse(&base_url)
            .map_err(|e| LedgerError::Config(format!("invalid node address {}: {}", base_url, e)))?;

        let client = Client::builder()
            .default_headers(auth_headers(token)?)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, LedgerError> {
        let response = request.send().await?;
        let response = check_status(response, what).await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("GET {}", path);
        }
        self.send(self.client.get(self.url(path)), what).await
    }
}

/// Build the request headers from the configured token.
///
/// The token is either a raw API token, a JSON string holding one, or a JSON
/// object mapping header names to values.
pub fn auth_headers(token: &str) -> Result<HeaderMap, LedgerError> {
    let mut headers = HeaderMap::new();
    let token = token.trim();
    if token.is_empty() {
        return Ok(headers);
    }

    let insert = |headers: &mut HeaderMap, name: &str, value: &str| -> Result<(), LedgerError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| LedgerError::Config(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| LedgerError::Config(format!("invalid header value: {}", e)))?;
        headers.insert(name, value);
        Ok(())
    };

    match serde_json::from_str::<Value>(token) {
        Ok(Value::String(raw)) => insert(&mut headers, API_TOKEN_HEADER, &raw)?,
        Ok(Value::Object(map)) => {
            for (name, value) in map.iter() {
                let value = match value {
                    Value::String(value) => value.clone(),
                    other => other.to_string(),
                };
                insert(&mut headers, name, &value)?;
            }
        }
        _ => insert(&mut headers, API_TOKEN_HEADER, token)?,
    }
    Ok(headers)
}

async fn check_status(response: Response, what: &str) -> Result<Response, LedgerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    if log::log_enabled!(log::Level::Debug) {
        debug!("{} failed with {}: {}", what, status, message);
    }

    Err(match status {
        StatusCode::NOT_FOUND => LedgerError::NotFound(what.to_owned()),
        _ => LedgerError::Http {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl LedgerClient for AlgodAPI {
    async fn compile_program(&self, source: &[u8]) -> Result<CompileResponse, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("compile_program: {} bytes", source.len());
        }
        let request = self
            .client
            .post(self.url("/v2/teal/compile"))
            .header(CONTENT_TYPE, BINARY_CONTENT_TYPE)
            .body(source.to_vec());
        self.send(request, "compile").await
    }

    async fn suggested_params(&self) -> Result<TransactionParams, LedgerError> {
        self.get("/v2/transactions/params", "transaction params")
            .await
    }

    async fn submit_raw_group(&self, group: &[Vec<u8>]) -> Result<String, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("submit_raw_group: {} transactions", group.len());
        }
        let body = group.concat();
        let response = self
            .client
            .post(self.url("/v2/transactions"))
            .header(CONTENT_TYPE, BINARY_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        // 400 means the node refused the group
        let response = match check_status(response, "transaction").await {
            Err(LedgerError::Http {
                status: 400,
                message,
            }) => return Err(LedgerError::Rejected(message)),
            other => other?,
        };
        let result: PostTransactionsResponse = response.json().await?;
        Ok(result.tx_id)
    }

    async fn status(&self) -> Result<NodeStatus, LedgerError> {
        self.get("/v2/status", "status").await
    }

    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, LedgerError> {
        self.get(&format!("/v2/status/wait-for-block-after/{}", round), "status")
            .await
    }

    async fn pending_transaction(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionResponse, LedgerError> {
        self.get(
            &format!("/v2/transactions/pending/{}", tx_id),
            &format!("transaction {}", tx_id),
        )
        .await
    }

    async fn account_information(
        &self,
        address: &Address,
    ) -> Result<AccountInformation, LedgerError> {
        self.get(
            &format!("/v2/accounts/{}", address),
            &format!("account {}", address),
        )
        .await
    }

    async fn application_global_state(
        &self,
        app_id: u64,
    ) -> Result<Vec<TealKeyValue>, LedgerError> {
        let application: Application = self
            .get(
                &format!("/v2/applications/{}", app_id),
                &format!("application {}", app_id),
            )
            .await?;
        Ok(application.params.global_state)
    }

    async fn box_by_name(&self, app_id: u64, name: &[u8]) -> Result<BoxContent, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("box_by_name: {} {}", app_id, String::from_utf8_lossy(name));
        }
        let request = self
            .client
            .get(self.url(&format!("/v2/applications/{}/box", app_id)))
            .query(&[("name", format!("b64:{}", STANDARD.encode(name)))]);
        let what = format!("box {}", String::from_utf8_lossy(name));
        let response: BoxResponse = self.send(request, &what).await?;
        response.try_into()
    }

    async fn box_names(&self, app_id: u64) -> Result<Vec<Vec<u8>>, LedgerError> {
        let response: BoxesResponse = self
            .get(
                &format!("/v2/applications/{}/boxes", app_id),
                &format!("application {}", app_id),
            )
            .await?;
        response
            .boxes
            .iter()
            .map(|descriptor| decode_base64("box name", &descriptor.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_token_header() {
        let headers = auth_headers("a".repeat(64).as_str()).unwrap();
        assert_eq!(headers.get(API_TOKEN_HEADER).unwrap(), "a".repeat(64).as_str());
    }

    #[test]
    fn test_json_token_header() {
        let headers = auth_headers(r#""secret""#).unwrap();
        assert_eq!(headers.get(API_TOKEN_HEADER).unwrap(), "secret");

        let headers = auth_headers(r#"{"X-API-Key": "abc"}"#).unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "abc");
        assert!(headers.get(API_TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_empty_token() {
        assert!(auth_headers("  ").unwrap().is_empty());
    }

    #[test]
    fn test_node_address() {
        let api = AlgodAPI::new("127.0.0.1:4001/", "").unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:4001");
        assert_eq!(api.url("/v2/status"), "http://127.0.0.1:4001/v2/status");
    }

    #[test]
    fn test_box_content_decoding() {
        let content = BoxContent::try_from(BoxResponse {
            name: STANDARD.encode("box_with_data"),
            round: Some(12),
            value: STANDARD.encode("A".repeat(100)),
        })
        .unwrap();
        assert_eq!(content.name_lossy(), "box_with_data");
        assert_eq!(content.len(), 100);
    }
}
