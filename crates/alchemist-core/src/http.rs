//! Shared plumbing for the JSON-over-HTTP clients

use crate::error::{parse_retry_after, ApiError};
use anyhow::{anyhow, Result};
use reqwest::header::RETRY_AFTER;
use reqwest::Response;
use serde_json::Value;
use std::env;
use std::time::Duration;

/// Client with a whole-request timeout
pub fn client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Read a required secret from the environment
pub fn api_key(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(anyhow!("{var} is not set")),
    }
}

pub fn transport_error(service: &'static str, err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        service,
        transient: err.is_timeout() || err.is_connect() || err.is_request(),
        message: err.to_string(),
    }
}

/// Turn a response into JSON, mapping failures to [`ApiError`]
pub async fn read_json(service: &'static str, res: Response) -> Result<Value> {
    let status = res.status();
    if !status.is_success() {
        let retry_after = res
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = res.text().await.unwrap_or_default();
        return Err(ApiError::from_status(service, status.as_u16(), body, retry_after).into());
    }

    let json: Value = res
        .json()
        .await
        .map_err(|e| ApiError::malformed(service, e.to_string()))?;

    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        return Err(ApiError::malformed(service, format!("API returned error: {error}")).into());
    }
    Ok(json)
}
