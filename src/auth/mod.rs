//! Credential type and session storage
//!
//! The credential is an opaque bearer token owned by [`SessionStore`]; all
//! other components only read it. Parsing from `Authorization` header values
//! lives in [`credential`], durable plus in-memory storage in [`store`].

pub mod credential;
pub mod store;

pub use credential::{Credential, ParseCredentialError};
pub use store::{CredentialFile, SessionObserver, SessionStore};
