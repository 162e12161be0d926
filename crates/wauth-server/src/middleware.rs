//! Authentication middleware

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};
use wauth_core::Outcome;
use wauth_strategy::AuthStrategy;

use crate::request::auth_request;

/// The authenticated user, attached to the request extensions on success
#[derive(Debug, Clone, Serialize)]
pub struct Authenticated<U> {
    pub user: U,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

/// State handed to [`require_auth`]
pub struct AuthLayerState<S> {
    pub strategy: Arc<S>,
    /// Largest body buffered to read credentials from
    pub body_limit: usize,
}

impl<S> AuthLayerState<S> {
    pub fn new(strategy: Arc<S>, body_limit: usize) -> Self {
        Self {
            strategy,
            body_limit,
        }
    }
}

impl<S> Clone for AuthLayerState<S> {
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
            body_limit: self.body_limit,
        }
    }
}

/// Run the strategy for every request.
///
/// Success continues with [`Authenticated`] in the request extensions,
/// a failure answers 401 and an error 500.
pub async fn require_auth<S>(
    State(state): State<AuthLayerState<S>>,
    request: Request<Body>,
    next: Next,
) -> Response
where
    S: AuthStrategy + 'static,
    S::User: Clone + Send + Sync,
{
    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            debug!("Rejecting request body: {}", e);
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "message": "Request body too large" })),
            )
                .into_response();
        }
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Failed to read request body" })),
            )
                .into_response();
        }
    };

    let req = auth_request(&parts, &bytes);

    match state.strategy.authenticate(req).await {
        Outcome::Success { user, info } => {
            parts.extensions.insert(Authenticated { user, info });
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Outcome::Fail(info) => {
            debug!("{} rejected {} {}", state.strategy.name(), parts.method, parts.uri.path());
            let message = info.unwrap_or_else(|| Value::String("Unauthorized".into()));
            (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
        }
        Outcome::Error(err) => {
            error!("{} failed: {}", state.strategy.name(), err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "code": err.code(), "message": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

/// Whether reading the body stopped at the length limit
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
