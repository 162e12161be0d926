//! HTTP hosting for the wauth strategy
//!
//! Converts axum requests into strategy requests and maps strategy
//! outcomes onto HTTP responses.

pub mod middleware;
pub mod request;
pub mod routes;
pub mod server;

pub use middleware::{require_auth, AuthLayerState, Authenticated};
pub use request::auth_request;
pub use server::AuthServer;
