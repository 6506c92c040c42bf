//! Outbound request dispatch
//!
//! The dispatcher is purely an attachment point: it reads the current
//! credential, adds the `Authorization` header when one is present, and
//! hands the request to the transport. No retry logic lives here.

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::error::Result;
use crate::retry::Attempt;
use crate::transport::Transport;
use crate::types::ApiResponse;

/// Attaches the current credential to outbound requests and issues them.
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
}

impl RequestDispatcher {
    /// Create a dispatcher over a transport and the session store
    pub fn new(transport: Arc<dyn Transport>, store: Arc<SessionStore>) -> Self {
        Self { transport, store }
    }

    /// Issue one attempt, returning the transport outcome unmodified.
    ///
    /// # Errors
    ///
    /// Propagates whatever the transport reports.
    pub async fn dispatch(&self, attempt: &Attempt) -> Result<ApiResponse> {
        let credential = self.store.get();
        let authenticated = credential.is_some();

        let request = match credential {
            Some(credential) => attempt
                .request()
                .clone()
                .with_header("authorization", credential.authorization_value()),
            None => attempt.request().clone(),
        };

        tracing::debug!(path = %request.path, authenticated, retried = attempt.is_retried(),
            "dispatching request");

        self.transport.send(&request).await
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher").finish_non_exhaustive()
    }
}
