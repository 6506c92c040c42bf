//! Core request and response types

pub mod request;
pub mod response;

pub use request::{ApiRequest, Method};
pub use response::ApiResponse;
