//! Route handlers

use axum::{http::StatusCode, Extension, Json};
use serde::Serialize;

use crate::middleware::Authenticated;

/// Liveness probe, no authentication
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Echo the authenticated user back
pub async fn whoami<U>(Extension(auth): Extension<Authenticated<U>>) -> Json<Authenticated<U>>
where
    U: Serialize + Clone + Send + Sync + 'static,
{
    Json(auth)
}
