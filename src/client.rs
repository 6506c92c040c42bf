//! StreamCast API client
//!
//! The client wires the session store, dispatcher, response guard and
//! refresh coordinator together and exposes the service operations. Every
//! request funnels through [`StreamcastClient::send`], which is where an
//! expired credential is detected and transparently renewed.

use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde::Serialize;

use crate::auth::{Credential, CredentialFile, SessionObserver, SessionStore};
use crate::dispatch::RequestDispatcher;
use crate::error::{ApiError, Result};
use crate::guard::{FailureClass, ResponseGuard};
use crate::refresh::{RefreshCoordinator, SessionExpiredCallback};
use crate::retry::Attempt;
use crate::transport::{HttpTransport, Transport};
use crate::types::{ApiRequest, ApiResponse};

const LOGIN_PATH: &str = "/auth/login";
const REFRESH_PATH: &str = "/auth/refresh";
const LOGOUT_PATH: &str = "/auth/logout";
const REGISTER_PATH: &str = "/auth/register";
const OTP_REQUEST_PATH: &str = "/auth/otp/request";
const OTP_VERIFY_PATH: &str = "/auth/otp/verify";
const VALIDATE_PATH: &str = "/auth/validate";
const ME_PATH: &str = "/users/me";
const CREATE_STREAM_PATH: &str = "/streams/create";

/// Application locations where a renewal failure must not force navigation
const DEFAULT_NO_REDIRECT_PATHS: &[&str] = &["/login", "/register"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Login request payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Username or email address
    #[serde(rename = "usernameOrEmail")]
    pub username_or_email: String,
    /// Account password
    pub password: String,
}

/// Registration request payload
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Email address
    pub email: String,
    /// Unique account name
    #[serde(rename = "userName")]
    pub user_name: String,
    /// Display name
    pub name: String,
    /// Account password
    pub password: String,
    /// Account role, `USER` for self-service registration
    pub role: String,
}

/// Stream creation payload
#[derive(Debug, Clone, Serialize)]
pub struct CreateStreamRequest {
    /// Stream title
    pub title: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Builder for [`StreamcastClient`]
#[derive(Default)]
pub struct StreamcastClientBuilder {
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    storage_path: Option<PathBuf>,
    observer: Option<SessionObserver>,
    on_session_expired: Option<SessionExpiredCallback>,
    no_redirect_paths: Option<Vec<String>>,
    timeout: Option<Duration>,
}

impl StreamcastClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service base URL (required unless a transport is provided)
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Provide a custom transport instead of the HTTP default
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set a custom path for the durable credential slot
    #[must_use]
    pub fn storage_path(mut self, path: PathBuf) -> Self {
        self.storage_path = Some(path);
        self
    }

    /// Register the session observer, invoked on every credential change
    #[must_use]
    pub fn on_session_change(mut self, observer: SessionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Register the terminal session-expired callback
    #[must_use]
    pub fn on_session_expired(mut self, callback: SessionExpiredCallback) -> Self {
        self.on_session_expired = Some(callback);
        self
    }

    /// Override the no-redirect locations (default `/login`, `/register`)
    #[must_use]
    pub fn no_redirect_paths(mut self, paths: Vec<String>) -> Self {
        self.no_redirect_paths = Some(paths);
        self
    }

    /// Set the transport request timeout (default 30 seconds)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] when neither a base URL nor a
    /// transport was provided, or the HTTP transport cannot be built.
    pub fn build(self) -> Result<StreamcastClient> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let transport: Arc<dyn Transport> = match (self.transport, self.base_url) {
            (Some(transport), _) => transport,
            (None, Some(base_url)) => Arc::new(HttpTransport::new(&base_url, timeout)?),
            (None, None) => {
                return Err(ApiError::invalid_config(
                    "either a base URL or a transport is required",
                ));
            }
        };

        let slot = self
            .storage_path
            .map(CredentialFile::with_path)
            .unwrap_or_default();
        let store = Arc::new(SessionStore::new(slot, self.observer));
        let dispatcher = Arc::new(RequestDispatcher::new(transport, store.clone()));
        let guard = ResponseGuard::new(vec![LOGIN_PATH.to_string(), REFRESH_PATH.to_string()]);
        let location = Arc::new(StdMutex::new("/".to_string()));
        let no_redirect_paths = self.no_redirect_paths.unwrap_or_else(|| {
            DEFAULT_NO_REDIRECT_PATHS
                .iter()
                .map(|p| (*p).to_string())
                .collect()
        });

        let coordinator = Arc::new(RefreshCoordinator::new(
            dispatcher.clone(),
            store.clone(),
            REFRESH_PATH.to_string(),
            no_redirect_paths,
            location.clone(),
            self.on_session_expired,
        ));

        Ok(StreamcastClient {
            store,
            dispatcher,
            guard,
            coordinator,
            location,
        })
    }
}

/// Client for the StreamCast service API.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct StreamcastClient {
    store: Arc<SessionStore>,
    dispatcher: Arc<RequestDispatcher>,
    guard: ResponseGuard,
    coordinator: Arc<RefreshCoordinator>,
    location: Arc<StdMutex<String>>,
}

impl StreamcastClient {
    /// Create a builder
    #[must_use]
    pub fn builder() -> StreamcastClientBuilder {
        StreamcastClientBuilder::new()
    }

    /// Send a request through the authenticated pipeline.
    ///
    /// On an expired-credential failure the request enters the renewal path:
    /// the session is refreshed (joining an in-flight renewal if one is
    /// already running) and the request replayed with the new credential.
    /// All other failures propagate unchanged.
    ///
    /// # Errors
    ///
    /// Returns the transport failure, or [`ApiError::RefreshFailed`] when
    /// the session could not be renewed.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut attempt = Attempt::new(request);

        match self.dispatcher.dispatch(&attempt).await {
            Ok(response) => Ok(response),
            Err(error) => match self.guard.classify(&attempt, &error) {
                FailureClass::AuthExpired => {
                    attempt.mark_retried();
                    self.coordinator.recover(attempt).await
                }
                class => {
                    tracing::debug!(?class, "propagating failure without renewal");
                    Err(error)
                }
            },
        }
    }

    /// Log in and store the credential from the `Authorization` response
    /// header.
    ///
    /// # Errors
    ///
    /// Returns the service failure, or [`ApiError::Auth`] when the response
    /// carried no usable credential.
    pub async fn login(&self, request: &LoginRequest) -> Result<()> {
        let response = self
            .send(ApiRequest::post(LOGIN_PATH, serde_json::to_value(request)?))
            .await?;

        let header = response
            .header("authorization")
            .ok_or_else(|| ApiError::auth("login response carried no credential"))?;
        let credential = Credential::from_header_value(header)?;

        self.store.set(Some(credential));
        Ok(())
    }

    /// Create an account. Registration does not log the account in.
    ///
    /// # Errors
    ///
    /// Returns the service failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse> {
        self.send(ApiRequest::post(
            REGISTER_PATH,
            serde_json::to_value(request)?,
        ))
        .await
    }

    /// Request a one-time passcode be mailed to the given address, returning
    /// the service's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns the service failure.
    pub async fn request_otp(&self, email: &str) -> Result<String> {
        let response = self
            .send(ApiRequest::post_empty(OTP_REQUEST_PATH).with_query("email", email))
            .await?;

        Ok(match response.body {
            serde_json::Value::String(message) => message,
            other => other
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Check a one-time passcode against the one mailed to the address.
    ///
    /// Reports `false` for a wrong or expired passcode the service rejected
    /// with a successful response.
    ///
    /// # Errors
    ///
    /// Returns the service failure.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<bool> {
        let response = self
            .send(
                ApiRequest::post_empty(OTP_VERIFY_PATH)
                    .with_query("email", email)
                    .with_query("otp", otp),
            )
            .await?;

        Ok(response
            .body
            .get("verified")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    /// Log out and clear the stored credential.
    ///
    /// The credential is only cleared when the service acknowledged the
    /// logout; on failure the session state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the service failure.
    pub async fn logout(&self) -> Result<()> {
        self.send(ApiRequest::post_empty(LOGOUT_PATH)).await?;
        self.store.set(None);
        Ok(())
    }

    /// Check whether the stored credential is still accepted by the service.
    ///
    /// A rejection clears the stored credential and reports `false`; a
    /// failed renewal also reports `false` (the coordinator already cleared
    /// the session). Connectivity failures propagate.
    ///
    /// # Errors
    ///
    /// Returns network and other non-authentication failures.
    pub async fn validate(&self) -> Result<bool> {
        match self.send(ApiRequest::get(VALIDATE_PATH)).await {
            Ok(_) => Ok(true),
            Err(ApiError::Status { .. }) => {
                self.store.set(None);
                Ok(false)
            }
            Err(ApiError::RefreshFailed(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Fetch the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns the service failure.
    pub async fn me(&self) -> Result<serde_json::Value> {
        Ok(self.send(ApiRequest::get(ME_PATH)).await?.body)
    }

    /// Create a stream and return its metadata.
    ///
    /// # Errors
    ///
    /// Returns the service failure.
    pub async fn create_stream(&self, request: &CreateStreamRequest) -> Result<serde_json::Value> {
        Ok(self
            .send(ApiRequest::post(
                CREATE_STREAM_PATH,
                serde_json::to_value(request)?,
            ))
            .await?
            .body)
    }

    /// Report the application's current location, consulted when deciding
    /// whether a session-expired signal may force navigation.
    pub fn set_location(&self, path: impl Into<String>) {
        *self.location.lock().expect("location lock poisoned") = path.into();
    }

    /// Current credential, if any
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.store.get()
    }

    /// Whether a credential is currently held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.has_credential()
    }
}

impl std::fmt::Debug for StreamcastClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamcastClient")
            .field("store", &self.store)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_base_url_or_transport() {
        let result = StreamcastClient::builder().build();
        assert!(matches!(result, Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn builder_with_base_url_builds() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = StreamcastClient::builder()
            .base_url("https://api.example.com/api")
            .storage_path(dir.path().join("credential"))
            .build()
            .unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn payload_field_names_match_service() {
        let login = LoginRequest {
            username_or_email: "alice".to_string(),
            password: "pw".to_string(),
        };
        let value = serde_json::to_value(&login).unwrap();
        assert!(value.get("usernameOrEmail").is_some());

        let register = RegisterRequest {
            email: "a@b.c".to_string(),
            user_name: "alice".to_string(),
            name: "Alice".to_string(),
            password: "pw".to_string(),
            role: "USER".to_string(),
        };
        let value = serde_json::to_value(&register).unwrap();
        assert!(value.get("userName").is_some());
        assert_eq!(value.get("role").and_then(serde_json::Value::as_str), Some("USER"));

        let stream = CreateStreamRequest {
            title: "t".to_string(),
            description: None,
        };
        let value = serde_json::to_value(&stream).unwrap();
        assert!(value.get("description").is_none());
    }
}
