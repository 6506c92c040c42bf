//! Outbound request descriptor

pub use reqwest::Method;

/// Description of one API request: method, service-relative path, optional
/// JSON body and any extra headers.
///
/// Requests are plain data so a failed one can be replayed verbatim after a
/// session renewal.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Service-relative path, e.g. `/users/me`
    pub path: String,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
    /// Query parameters as (name, value) pairs, encoded by the transport
    pub query: Vec<(String, String)>,
    /// Extra headers as (lowercased name, value) pairs
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request with no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request with a JSON body
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    /// Create a POST request with an empty body
    pub fn post_empty(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Return the request with a query parameter appended.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Look up a query parameter by name
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Return the request with an extra header attached.
    ///
    /// Header names are lowercased; setting a name again replaces the
    /// previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        self.headers.retain(|(existing, _)| *existing != name);
        self.headers.push((name, value.into()));
        self
    }

    /// Look up an extra header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_constructor() {
        let request = ApiRequest::get("/users/me");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/users/me");
        assert!(request.body.is_none());
    }

    #[test]
    fn post_carries_body() {
        let request = ApiRequest::post("/streams/create", serde_json::json!({"title": "t"}));
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.unwrap()["title"], "t");
    }

    #[test]
    fn with_query_appends_parameters() {
        let request = ApiRequest::post_empty("/auth/otp/verify")
            .with_query("email", "a@b.c")
            .with_query("otp", "123456");
        assert_eq!(request.query_param("email"), Some("a@b.c"));
        assert_eq!(request.query_param("otp"), Some("123456"));
        assert_eq!(request.query_param("missing"), None);
    }

    #[test]
    fn with_header_replaces_existing() {
        let request = ApiRequest::get("/x")
            .with_header("Authorization", "Bearer a")
            .with_header("authorization", "Bearer b");
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer b"));
        assert_eq!(request.headers.len(), 1);
    }
}
