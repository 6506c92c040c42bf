//! Failure classification for the renewal path
//!
//! Every failure coming out of the dispatcher is classified before anything
//! else happens. Only the [`FailureClass::AuthExpired`] class is absorbed by
//! the refresh coordinator; every other class propagates to the caller
//! untouched.

use crate::error::ApiError;
use crate::retry::Attempt;

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Expired-credential failure eligible for session renewal
    AuthExpired,
    /// Expired-credential failure on an attempt that was already replayed
    AlreadyRetried,
    /// Expired-credential failure on a bootstrap endpoint (login, refresh)
    Bootstrap,
    /// Any other failure; renewal is not involved
    Other,
}

/// Decides whether a failure qualifies for renewal handling.
#[derive(Debug, Clone)]
pub struct ResponseGuard {
    bootstrap_paths: Vec<String>,
}

impl ResponseGuard {
    /// Create a guard with the given bootstrap endpoint paths.
    ///
    /// Requests to these paths never trigger renewal; the login and refresh
    /// operations must not recursively re-enter the path they implement.
    pub fn new(bootstrap_paths: Vec<String>) -> Self {
        Self { bootstrap_paths }
    }

    /// Classify a failed attempt.
    ///
    /// Eligible for renewal iff the failure is an unauthorized status or a
    /// no-status network failure, the attempt has not already been through a
    /// renewal cycle, and the target is not a bootstrap endpoint.
    pub fn classify(&self, attempt: &Attempt, error: &ApiError) -> FailureClass {
        if !error.is_auth_expired() {
            return FailureClass::Other;
        }

        let class = if self.is_bootstrap(attempt.path()) {
            FailureClass::Bootstrap
        } else if attempt.is_retried() {
            FailureClass::AlreadyRetried
        } else {
            FailureClass::AuthExpired
        };

        tracing::debug!(path = %attempt.path(), ?class, status = ?error.status_code(),
            "classified expired-credential failure");
        class
    }

    fn is_bootstrap(&self, path: &str) -> bool {
        self.bootstrap_paths.iter().any(|p| p == path)
    }
}
