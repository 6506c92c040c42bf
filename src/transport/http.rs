//! HTTP transport over reqwest

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::Transport;
use crate::error::{ApiError, Result};
use crate::types::{ApiRequest, ApiResponse};

/// HTTP transport issuing requests against a base URL.
///
/// Carries a cookie store because the refresh endpoint authenticates through
/// an HTTP-only session cookie rather than the bearer credential.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpTransport {
    /// Create a transport for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] if the base URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ApiError::invalid_config(format!("invalid base URL: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> reqwest::Url {
        // Url::join would drop the base path for absolute inputs, so splice
        // the paths by hand.
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut url = self.url_for(&request.path);
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // Connect failures, timeouts and DNS errors never carry a status;
        // they surface as the Network class.
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            tracing::debug!(path = %request.path, status = status.as_u16(), "request succeeded");
            Ok(ApiResponse::new(status.as_u16(), headers, body))
        } else {
            let message = error_message(&body, status);
            tracing::debug!(path = %request.path, status = status.as_u16(), %message,
                "request failed");
            Err(ApiError::status(status.as_u16(), message))
        }
    }
}

/// Extract a human-readable message from an error response body.
///
/// The service reports errors as a plain string, a `message` field or an
/// `error` field depending on the handler; fall back to the status reason.
fn error_message(body: &Value, status: reqwest::StatusCode) -> String {
    let from_body = match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key))
            .filter_map(Value::as_str)
            .find(|text| !text.trim().is_empty())
            .map(str::to_string),
        _ => None,
    };

    from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining_preserves_base_path() {
        let transport =
            HttpTransport::new("https://api.example.com/api", Duration::from_secs(5)).unwrap();
        let url = transport.url_for("/auth/refresh");
        assert_eq!(url.as_str(), "https://api.example.com/api/auth/refresh");

        let url = transport.url_for("users/me");
        assert_eq!(url.as_str(), "https://api.example.com/api/users/me");
    }

    #[test]
    fn error_message_prefers_body_fields() {
        let status = reqwest::StatusCode::UNAUTHORIZED;
        assert_eq!(
            error_message(&serde_json::json!("token expired"), status),
            "token expired"
        );
        assert_eq!(
            error_message(&serde_json::json!({"message": "expired"}), status),
            "expired"
        );
        assert_eq!(
            error_message(&serde_json::json!({"error": "expired"}), status),
            "expired"
        );
        assert_eq!(error_message(&Value::Null, status), "Unauthorized");
    }
}
