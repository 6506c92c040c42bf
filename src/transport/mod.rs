//! Transport layer for reaching the StreamCast service
//!
//! The request pipeline only needs a "send this request, get a response or
//! failure" capability; everything above it is transport-agnostic. The
//! shipped implementation is [`HttpTransport`] over reqwest, and tests plug
//! in scripted fakes through the same trait.

pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ApiRequest, ApiResponse};

/// Transport trait for issuing requests against the service.
///
/// Implementations return `Ok` only for success statuses. Error statuses map
/// to [`ApiError::Status`](crate::ApiError::Status) and failures that never
/// produced a status (connect errors, timeouts) map to
/// [`ApiError::Network`](crate::ApiError::Network).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and await its outcome
    ///
    /// # Errors
    /// Returns an error for non-success statuses and connectivity failures.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

pub use http::HttpTransport;
