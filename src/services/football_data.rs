use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::errors::AppError;

/// Why an upstream call produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API request failed: {0}")]
    UpstreamStatus(u16),

    #[error("invalid payload: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<FetchFailure> for AppError {
    fn from(failure: FetchFailure) -> Self {
        AppError::external_api(failure.to_string())
    }
}

/// Source of raw provider JSON. The HTTP client is the production
/// implementation; tests substitute canned payloads.
#[async_trait]
pub trait FootballProvider: Send + Sync {
    async fn get_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchFailure>;
}

#[derive(Clone)]
pub struct FootballDataClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl FootballDataClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

#[async_trait]
impl FootballProvider for FootballDataClient {
    async fn get_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, FetchFailure> {
        let url = self.url_for(endpoint);
        tracing::debug!("➡️ GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("X-Auth-Token", &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Upstream {} answered {}", url, status);
            return Err(FetchFailure::UpstreamStatus(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchFailure::Parse(e.to_string()))
    }
}

/// Turns the proxy's JSON-encoded `params` object into query pairs. Nulls are
/// dropped, strings pass through, arrays become comma-separated lists and any
/// other value uses its JSON text.
pub fn query_params_from_json(raw: &str) -> Result<Vec<(String, String)>, FetchFailure> {
    let parsed: serde_json::Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| FetchFailure::Parse(e.to_string()))?;

    Ok(parsed
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key, param_value(&value)))
        .collect())
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(param_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
