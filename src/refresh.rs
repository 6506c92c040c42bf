//! Single-flight session renewal
//!
//! The coordinator is the core state machine of the SDK. At most one renewal
//! call is in flight process-wide; requests that expire while it runs are
//! queued in arrival order and settled as one batch when the renewal
//! finishes. Without the single-flight guarantee, N concurrently expiring
//! requests would each fire their own renewal call and race to overwrite the
//! stored credential.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, oneshot};

use crate::auth::{Credential, SessionStore};
use crate::dispatch::RequestDispatcher;
use crate::error::{ApiError, Result};
use crate::retry::Attempt;
use crate::types::{ApiRequest, ApiResponse};

/// Callback raised when renewal fails terminally and the application should
/// treat the session as expired (typically by navigating to login).
pub type SessionExpiredCallback = Arc<dyn Fn() + Send + Sync>;

/// A request parked behind an in-flight renewal, settled exactly once.
struct PendingRequest {
    attempt: Attempt,
    completion: oneshot::Sender<Result<ApiResponse>>,
}

/// Renewal state. `Renewing` exists at most once at any time, and only a
/// `Renewing` state may hold queued requests.
enum RefreshState {
    Idle,
    Renewing { queue: Vec<PendingRequest> },
}

/// Coordinates credential renewal across concurrent requests.
///
/// All renewal state lives in fields of this one instance; the client
/// constructs a single coordinator and shares it by `Arc`.
pub struct RefreshCoordinator {
    dispatcher: Arc<RequestDispatcher>,
    store: Arc<SessionStore>,
    state: Mutex<RefreshState>,
    refresh_path: String,
    no_redirect_paths: Vec<String>,
    location: Arc<StdMutex<String>>,
    on_session_expired: Option<SessionExpiredCallback>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        dispatcher: Arc<RequestDispatcher>,
        store: Arc<SessionStore>,
        refresh_path: String,
        no_redirect_paths: Vec<String>,
        location: Arc<StdMutex<String>>,
        on_session_expired: Option<SessionExpiredCallback>,
    ) -> Self {
        Self {
            dispatcher,
            store,
            state: Mutex::new(RefreshState::Idle),
            refresh_path,
            no_redirect_paths,
            location,
            on_session_expired,
        }
    }

    /// Absorb an expired-credential failure.
    ///
    /// The attempt joins the pending queue; the first arrival while idle
    /// also starts the renewal cycle. The returned future resolves with the
    /// replayed request's outcome on renewal success, or with a
    /// [`ApiError::RefreshFailed`] rejection on renewal failure.
    pub(crate) async fn recover(self: &Arc<Self>, attempt: Attempt) -> Result<ApiResponse> {
        let (completion, settled) = oneshot::channel();
        let pending = PendingRequest {
            attempt,
            completion,
        };

        let starts_cycle = {
            let mut state = self.state.lock().await;
            match &mut *state {
                RefreshState::Idle => {
                    tracing::debug!(path = %pending.attempt.path(), "starting renewal cycle");
                    *state = RefreshState::Renewing {
                        queue: vec![pending],
                    };
                    true
                }
                RefreshState::Renewing { queue } => {
                    tracing::debug!(path = %pending.attempt.path(), queued = queue.len() + 1,
                        "renewal in flight, queueing request");
                    queue.push(pending);
                    false
                }
            }
        };

        if starts_cycle {
            // The cycle runs on its own task so it always settles, even if
            // the triggering caller stops awaiting.
            let coordinator = Arc::clone(self);
            tokio::spawn(async move { coordinator.run_cycle().await });
        }

        match settled.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::refresh_failed(
                "renewal cycle dropped before settling",
            )),
        }
    }

    /// Run one full Idle -> Renewing -> Idle cycle and settle the queue.
    async fn run_cycle(&self) {
        let outcome = self.renew().await;

        // Settle the state before touching the network again; the queue is
        // handed off as one batch and the coordinator is ready for a future
        // trigger.
        let queue = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Renewing { queue } => queue,
                RefreshState::Idle => Vec::new(),
            }
        };

        match outcome {
            Ok(credential) => {
                tracing::debug!(replaying = queue.len(), "renewal succeeded");
                self.store.set(Some(credential));

                for pending in queue {
                    let result = self.replay(&pending.attempt).await;
                    // A dropped receiver means the caller went away; the
                    // outcome is theirs to discard.
                    let _ = pending.completion.send(result);
                }
            }
            Err(error) => {
                tracing::warn!(%error, rejecting = queue.len(), "renewal failed, session expired");
                self.store.set(None);
                self.signal_session_expired();

                let reason = match &error {
                    ApiError::RefreshFailed(message) => message.clone(),
                    other => other.to_string(),
                };
                for pending in queue {
                    let _ = pending
                        .completion
                        .send(Err(ApiError::refresh_failed(reason.clone())));
                }
            }
        }
    }

    /// Call the renewal endpoint and parse the credential it returns.
    async fn renew(&self) -> Result<Credential> {
        let attempt = Attempt::new(ApiRequest::post_empty(&self.refresh_path));
        let response = self.dispatcher.dispatch(&attempt).await?;

        let header = response
            .header("authorization")
            .ok_or_else(|| ApiError::refresh_failed("refresh response carried no credential"))?;

        Credential::from_header_value(header).map_err(|error| {
            ApiError::refresh_failed(format!("refresh response credential unusable: {error}"))
        })
    }

    /// Re-issue a queued request with the renewed credential attached.
    ///
    /// Replays go through the dispatcher only, never back into the pipeline:
    /// the attempt already spent its one renewal, so a second failure of any
    /// kind propagates to the caller.
    async fn replay(&self, attempt: &Attempt) -> Result<ApiResponse> {
        tracing::debug!(path = %attempt.path(), "replaying request after renewal");
        match self.dispatcher.dispatch(attempt).await {
            Ok(response) => Ok(response),
            Err(error) => {
                tracing::debug!(path = %attempt.path(), %error, "replayed request failed");
                Err(error)
            }
        }
    }

    /// Raise the terminal session-expired signal unless the application is
    /// currently on a no-redirect location (login, registration), where a
    /// forced navigation would loop.
    fn signal_session_expired(&self) {
        let location = self
            .location
            .lock()
            .expect("location lock poisoned")
            .clone();
        if self.no_redirect_paths.iter().any(|p| *p == location) {
            tracing::debug!(%location, "suppressing session-expired signal on no-redirect path");
            return;
        }

        if let Some(callback) = &self.on_session_expired {
            callback();
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_path", &self.refresh_path)
            .field("no_redirect_paths", &self.no_redirect_paths)
            .finish_non_exhaustive()
    }
}
