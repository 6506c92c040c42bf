//! Opaque access credential and header-value parsing

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing a credential value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCredentialError {
    /// The value was empty after stripping the scheme prefix
    #[error("credential value is empty")]
    Empty,

    /// The value was the literal `null` placeholder some stores leak
    #[error("credential value is a null placeholder")]
    NullPlaceholder,
}

/// Opaque access token attached to outbound requests.
///
/// The token carries no locally verifiable expiry; validity is only ever
/// learned from the service accepting or rejecting a request. Construction
/// goes through [`Credential::from_header_value`] so that prefix stripping
/// and placeholder rejection happen in exactly one place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Parse a credential from an `Authorization` header value.
    ///
    /// Accepts either `Bearer <token>` or a raw token. Empty values and the
    /// literal string `null` are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ParseCredentialError`] when the value holds no usable token.
    pub fn from_header_value(value: &str) -> Result<Self, ParseCredentialError> {
        let raw = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if raw.is_empty() {
            Err(ParseCredentialError::Empty)
        } else if raw == "null" {
            Err(ParseCredentialError::NullPlaceholder)
        } else {
            Ok(Self(raw.to_owned()))
        }
    }

    /// Raw token string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an outbound `Authorization` header
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Token material stays out of logs and debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_prefixed_value() {
        let credential = Credential::from_header_value("Bearer tok123").unwrap();
        assert_eq!(credential.as_str(), "tok123");
    }

    #[test]
    fn parses_raw_value() {
        let credential = Credential::from_header_value("tok123").unwrap();
        assert_eq!(credential.as_str(), "tok123");
        assert_eq!(credential.authorization_value(), "Bearer tok123");
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(
            Credential::from_header_value(""),
            Err(ParseCredentialError::Empty)
        );
        assert_eq!(
            Credential::from_header_value("Bearer "),
            Err(ParseCredentialError::Empty)
        );
    }

    #[test]
    fn rejects_null_placeholder() {
        assert_eq!(
            Credential::from_header_value("null"),
            Err(ParseCredentialError::NullPlaceholder)
        );
        assert_eq!(
            Credential::from_header_value("Bearer null"),
            Err(ParseCredentialError::NullPlaceholder)
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let credential = Credential::from_header_value("secret").unwrap();
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }
}
