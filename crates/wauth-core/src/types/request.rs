//! Authentication request model

use http::HeaderMap;
use std::collections::HashMap;

/// The parts of an incoming request a strategy may read.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    headers: HeaderMap,
    body: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl AuthRequest {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: HashMap<String, String>) -> Self {
        self.body = body;
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Add a header, ignoring names or values that are not valid HTTP
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    pub fn with_query_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value decoded as UTF-8; other encodings are treated as absent
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }

    pub fn body_field(&self, name: &str) -> Option<&str> {
        non_empty(self.body.get(name))
    }

    pub fn query_field(&self, name: &str) -> Option<&str> {
        non_empty(self.query.get(name))
    }

    /// Body field, falling back to the query string
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body_field(name).or_else(|| self.query_field(name))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}
