//! Inbound response representation

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::error::Result;

/// A successful response from the service: status, headers and parsed body.
///
/// Bodies that are not valid JSON are kept as a JSON string; empty bodies
/// read as `null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    headers: HashMap<String, String>,
    /// Response body
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Build a response; header names are lowercased for lookup.
    #[must_use]
    pub fn new(
        status: u16,
        headers: impl IntoIterator<Item = (String, String)>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            body,
        }
    }

    /// Look up a response header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Deserialize the body into a typed value
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}
