//! Per-attempt retry marking
//!
//! A request that has already been replayed once after a session renewal
//! must never re-enter the renewal path, otherwise a service that rejects
//! the freshly issued credential would cause an infinite retry loop.

use crate::types::ApiRequest;

/// One delivery attempt: the immutable request plus a once-settable mark
/// recording that it has already been through a renewal cycle.
#[derive(Debug)]
pub struct Attempt {
    request: ApiRequest,
    retried: bool,
}

impl Attempt {
    /// Wrap a request for delivery
    #[must_use]
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    /// The wrapped request
    #[must_use]
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Convenience accessor for the request path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Whether this attempt already triggered a renewal
    #[must_use]
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Record that this attempt entered the renewal path. Irreversible.
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_is_unset_initially_and_sticks() {
        let mut attempt = Attempt::new(ApiRequest::get("/users/me"));
        assert!(!attempt.is_retried());

        attempt.mark_retried();
        assert!(attempt.is_retried());
        assert_eq!(attempt.path(), "/users/me");
    }
}
