//! # StreamCast client SDK for Rust
//!
//! Async client for the StreamCast streaming service. The SDK issues
//! authenticated requests and transparently renews an expiring session
//! credential without disrupting in-flight calls: when a request fails with
//! an expired credential, exactly one renewal runs while concurrent failures
//! queue behind it, and every queued request is replayed in arrival order
//! with the new credential.
//!
//! ## Quick Start
//!
//! ```no_run
//! use streamcast_client::{LoginRequest, StreamcastClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StreamcastClient::builder()
//!         .base_url("https://api.streamcast.example/api")
//!         .build()?;
//!
//!     client
//!         .login(&LoginRequest {
//!             username_or_email: "alice".to_string(),
//!             password: "secret".to_string(),
//!         })
//!         .await?;
//!
//!     let profile = client.me().await?;
//!     println!("profile: {profile}");
//!     Ok(())
//! }
//! ```
//!
//! ## Session renewal
//!
//! The request pipeline is dispatcher -> guard -> coordinator:
//!
//! - [`dispatch::RequestDispatcher`] attaches the stored credential as a
//!   bearer `Authorization` header and issues the request.
//! - [`guard::ResponseGuard`] classifies failures; only an unauthorized
//!   status (or a no-status network failure) on a request that is neither a
//!   bootstrap call nor already replayed enters the renewal path.
//! - [`refresh::RefreshCoordinator`] runs at most one `POST /auth/refresh`
//!   at a time, queues requests that expire meanwhile, and on success
//!   replays them in order with the renewed credential. On failure it clears
//!   the session, rejects the whole queue and raises the session-expired
//!   callback (suppressed on the configured no-redirect locations).
//!
//! Observe session state through the builder callbacks:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use streamcast_client::StreamcastClient;
//! # fn example() -> streamcast_client::Result<()> {
//! let client = StreamcastClient::builder()
//!     .base_url("https://api.streamcast.example/api")
//!     .on_session_change(Arc::new(|credential| {
//!         println!("authenticated: {}", credential.is_some());
//!     }))
//!     .on_session_expired(Arc::new(|| {
//!         println!("session expired, back to login");
//!     }))
//!     .build()?;
//! # let _ = client;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for
//! structured logging. Events are always emitted but are zero-cost when no
//! subscriber is attached; attach one with `tracing_subscriber::fmt::init()`
//! to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod refresh;
pub mod retry;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use auth::{Credential, CredentialFile, ParseCredentialError, SessionObserver, SessionStore};
pub use client::{
    CreateStreamRequest, LoginRequest, RegisterRequest, StreamcastClient, StreamcastClientBuilder,
};
pub use error::{ApiError, Result};
pub use guard::{FailureClass, ResponseGuard};
pub use refresh::{RefreshCoordinator, SessionExpiredCallback};
pub use retry::Attempt;
pub use transport::{HttpTransport, Transport};
pub use types::{ApiRequest, ApiResponse, Method};

/// Version of the SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
