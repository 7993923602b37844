//! JSON-RPC 2.0 transport.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::RpcError;

/// Async JSON-RPC capability. The facades talk to the node exclusively
/// through this trait so tests can inject a mock transport.
#[async_trait]
pub trait JsonRpcClient: Send + Sync {
    /// Issue one JSON-RPC 2.0 call against an endpoint path
    /// (e.g. `/ext/bc/X`) and return the `result` value.
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// HTTP implementation over `reqwest`.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for a node base URL (e.g. `https://127.0.0.1:9650`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl JsonRpcClient for HttpClient {
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(RpcError::Transport(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Transport(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error") {
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(RpcError::Node { code, message });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| RpcError::InvalidResponse("response carries no result".into()))
    }
}

/// Pull a field that nodes serve as a decimal string (sometimes a number).
pub(crate) fn decimal_field(value: &Value, key: &str) -> Result<u64, RpcError> {
    let field = value
        .get(key)
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing field {key}")))?;
    if let Some(n) = field.as_u64() {
        return Ok(n);
    }
    let s = field
        .as_str()
        .ok_or_else(|| RpcError::InvalidResponse(format!("field {key} is not a number")))?;
    avax_types::bytes::u64_from_decimal_str(s)
        .map_err(|_| RpcError::InvalidResponse(format!("field {key} is not a decimal string")))
}

/// Pull a string field.
pub(crate) fn string_field(value: &Value, key: &str) -> Result<String, RpcError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing field {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_field_accepts_strings_and_numbers() {
        let v = json!({"a": "123", "b": 456});
        assert_eq!(decimal_field(&v, "a").unwrap(), 123);
        assert_eq!(decimal_field(&v, "b").unwrap(), 456);
        assert!(decimal_field(&v, "missing").is_err());
        assert!(decimal_field(&json!({"a": "x"}), "a").is_err());
    }

    #[test]
    fn string_field_requires_presence() {
        let v = json!({"s": "hello"});
        assert_eq!(string_field(&v, "s").unwrap(), "hello");
        assert!(string_field(&v, "t").is_err());
    }
}
