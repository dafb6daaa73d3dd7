//! Latest-transaction lookup against an Etherscan-compatible explorer API.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(9);

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("explorer request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("explorer response parsing error: {0}")]
    Parse(String),

    #[error("explorer API error: {message}")]
    ApiError { message: String },
}

/// One transaction as reported by the explorer.
///
/// Only `hash` and `input` drive the pipeline; the rest is kept for logging.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TransactionRecord {
    pub fn new(hash: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            input: input.into(),
            block_number: None,
            extra: HashMap::new(),
        }
    }

    /// True when the transaction carries no call data.
    pub fn has_no_calldata(&self) -> bool {
        let input = self.input.trim();
        input.is_empty() || input == "0x"
    }
}

#[derive(Debug, Deserialize)]
struct EtherScanResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

/// Source of the watched wallet's most recent transaction.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn latest_transaction(&self) -> Result<Option<TransactionRecord>, ExplorerError>;
}

pub struct BasescanClient {
    api_url: String,
    wallet_address: Address,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl BasescanClient {
    pub fn new(api_url: impl Into<String>, wallet_address: Address, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            wallet_address,
            api_key,
            http_client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl TransactionSource for BasescanClient {
    async fn latest_transaction(&self) -> Result<Option<TransactionRecord>, ExplorerError> {
        let wallet = self.wallet_address.to_string();
        let mut query = vec![
            ("module", "account"),
            ("action", "txlist"),
            ("address", wallet.as_str()),
            ("page", "1"),
            ("offset", "1"),
            ("sort", "desc"),
        ];
        if let Some(api_key) = self.api_key.as_deref() {
            query.push(("apikey", api_key));
        }

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;
        let body: EtherScanResponse = response.json().await?;
        parse_latest(body)
    }
}

fn parse_latest(body: EtherScanResponse) -> Result<Option<TransactionRecord>, ExplorerError> {
    match body.result {
        serde_json::Value::Array(items) if body.status == "1" => match items.into_iter().next() {
            Some(first) => serde_json::from_value(first)
                .map(Some)
                .map_err(|e| ExplorerError::Parse(e.to_string())),
            None => Ok(None),
        },
        serde_json::Value::Array(items) if items.is_empty() => Ok(None),
        serde_json::Value::String(detail) => Err(ExplorerError::ApiError {
            message: format!("{}: {}", body.message, detail),
        }),
        _ => Err(ExplorerError::ApiError {
            message: body.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> EtherScanResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_latest_takes_first_record() {
        let response = body(json!({
            "status": "1",
            "message": "OK",
            "result": [
                {"hash": "0xabc", "input": "0x1234", "blockNumber": "100", "from": "0x01"},
                {"hash": "0xdef", "input": "0x"}
            ]
        }));

        let record = parse_latest(response).unwrap().unwrap();
        assert_eq!(record.hash, "0xabc");
        assert_eq!(record.input, "0x1234");
        assert_eq!(record.block_number.as_deref(), Some("100"));
        assert_eq!(record.extra.get("from"), Some(&json!("0x01")));
    }

    #[test]
    fn test_parse_latest_no_transactions() {
        let response = body(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        }));
        assert_eq!(parse_latest(response).unwrap(), None);
    }

    #[test]
    fn test_parse_latest_api_error() {
        let response = body(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        }));
        match parse_latest(response) {
            Err(ExplorerError::ApiError { message }) => {
                assert_eq!(message, "NOTOK: Max rate limit reached")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_latest_malformed_record() {
        let response = body(json!({
            "status": "1",
            "message": "OK",
            "result": [{"input": "0x"}]
        }));
        assert!(matches!(parse_latest(response), Err(ExplorerError::Parse(_))));
    }

    #[test]
    fn test_has_no_calldata() {
        assert!(TransactionRecord::new("0xabc", "0x").has_no_calldata());
        assert!(TransactionRecord::new("0xabc", "").has_no_calldata());
        assert!(!TransactionRecord::new("0xabc", "0x12345678").has_no_calldata());
    }
}
