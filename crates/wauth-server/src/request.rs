//! Request conversion

use axum::http::{header::CONTENT_TYPE, request::Parts};
use serde_json::{Map, Value};
use std::collections::HashMap;
use wauth_core::AuthRequest;

/// Build the strategy's view of a request from its head and buffered body.
///
/// Body fields are read from JSON objects and url-encoded forms; any other
/// content type contributes no fields.
pub fn auth_request(parts: &Parts, body: &[u8]) -> AuthRequest {
    let query = parts.uri.query().map(parse_form).unwrap_or_default();

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let fields = if content_type.starts_with("application/json") {
        parse_json(body)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        std::str::from_utf8(body).map(parse_form).unwrap_or_default()
    } else {
        HashMap::new()
    };

    AuthRequest::new(parts.headers.clone())
        .with_body(fields)
        .with_query(query)
}

fn parse_form(input: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(input)
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

/// Top-level scalar members of a JSON object, stringified
fn parse_json(body: &[u8]) -> HashMap<String, String> {
    let Ok(object) = serde_json::from_slice::<Map<String, Value>>(body) else {
        return HashMap::new();
    };

    object
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(s) => Some((name, s)),
            Value::Number(n) => Some((name, n.to_string())),
            Value::Bool(b) => Some((name, b.to_string())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, content_type: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_query_fields() {
        let req = auth_request(&parts("/login?username=jdoe&password=p%40ss", None), b"");
        assert_eq!(req.query_field("username"), Some("jdoe"));
        assert_eq!(req.field("password"), Some("p@ss"));
    }

    #[test]
    fn test_json_body() {
        let req = auth_request(
            &parts("/login", Some("application/json; charset=utf-8")),
            br#"{"username": "jdoe", "password": "x", "pin": 1234, "nested": {"a": 1}}"#,
        );
        assert_eq!(req.body_field("username"), Some("jdoe"));
        assert_eq!(req.body_field("pin"), Some("1234"));
        assert_eq!(req.body_field("nested"), None);
    }

    #[test]
    fn test_form_body_wins_over_query() {
        let req = auth_request(
            &parts("/login?username=other", Some("application/x-www-form-urlencoded")),
            b"username=jdoe&password=x",
        );
        assert_eq!(req.field("username"), Some("jdoe"));
    }

    #[test]
    fn test_unknown_or_malformed_body_is_ignored() {
        let req = auth_request(&parts("/login", Some("text/plain")), b"username=jdoe");
        assert_eq!(req.field("username"), None);

        let req = auth_request(&parts("/login", Some("application/json")), b"[1, 2]");
        assert_eq!(req.field("username"), None);
    }

    #[test]
    fn test_headers_are_kept() {
        let mut parts = parts("/", None);
        parts
            .headers
            .insert("x-iisnode-logon_user", "CORP\\jdoe".parse().unwrap());
        let req = auth_request(&parts, b"");
        assert_eq!(req.header("x-iisnode-logon_user"), Some("CORP\\jdoe"));
    }
}
