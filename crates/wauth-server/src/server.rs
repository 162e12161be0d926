//! Server implementation

use axum::{
    middleware,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;
use wauth_core::{config::ServerConfig, Result};
use wauth_strategy::AuthStrategy;

use crate::middleware::{require_auth, AuthLayerState};
use crate::routes;

/// HTTP server protecting its routes with an authentication strategy
pub struct AuthServer<S> {
    config: ServerConfig,
    strategy: Arc<S>,
}

impl<S> AuthServer<S>
where
    S: AuthStrategy + 'static,
    S::User: Serialize + Clone + Send + Sync,
{
    pub fn new(config: ServerConfig, strategy: Arc<S>) -> Self {
        Self { config, strategy }
    }

    pub async fn run(self) -> Result<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("wauth server listening on http://{}", addr);
        info!("Authenticating with the {} strategy", self.strategy.name());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("wauth server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        let auth = AuthLayerState::new(self.strategy.clone(), self.config.body_limit_bytes);

        Router::new()
            // Protected routes
            .route(
                "/whoami",
                get(routes::whoami::<S::User>).post(routes::whoami::<S::User>),
            )
            .route_layer(middleware::from_fn_with_state(auth, require_auth::<S>))
            // Open routes
            .route("/health", get(routes::health))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::default().include_headers(true)),
            )
            .layer(CorsLayer::permissive())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wauth_core::{Error, Profile, Verified};
    use wauth_strategy::{Strategy, StrategyOptions, Verify};

    fn server(options: StrategyOptions, verify: Verify<Profile>) -> Router {
        let strategy = Strategy::new(options, verify).unwrap();
        AuthServer::new(ServerConfig::default(), Arc::new(strategy)).router()
    }

    fn accept() -> Verify<Profile> {
        Verify::profile(|profile| async move { Ok(Verified::accept(profile)) })
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let app = server(StrategyOptions::default(), accept());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_identity_header_authenticates() {
        let app = server(StrategyOptions::default(), accept());

        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("x-iisnode-logon_user", "CORP\\jdoe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"user": {"id": "jdoe", "name": "jdoe"}})
        );
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let app = server(StrategyOptions::default(), accept());

        let response = app
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({"message": "Unauthorized"}));
    }

    #[tokio::test]
    async fn test_rejection_info_is_returned() {
        let verify = Verify::profile(|_profile| async move {
            Ok(Verified::reject().with_info("Account disabled"))
        });
        let app = server(StrategyOptions::default(), verify);

        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("x-iisnode-logon_user", "CORP\\jdoe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({"message": "Account disabled"}));
    }

    #[tokio::test]
    async fn test_callback_error_is_internal_error() {
        let verify = Verify::profile(|_profile| async move {
            Err(Error::Verify(anyhow::anyhow!("profile store unavailable")))
        });
        let app = server(StrategyOptions::default(), verify);

        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("x-iisnode-logon_user", "CORP\\jdoe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["code"], "VerifyError");
    }

    #[tokio::test]
    async fn test_password_mode_reads_form_body() {
        let options = StrategyOptions {
            integrated: false,
            ..Default::default()
        };
        let app = server(options, accept());

        let response = app
            .oneshot(
                Request::post("/whoami")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=jdoe&password=x"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["user"]["id"], "jdoe");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let options = StrategyOptions {
            integrated: false,
            ..Default::default()
        };
        let strategy = Strategy::new(options, accept()).unwrap();
        let config = ServerConfig {
            body_limit_bytes: 8,
            ..Default::default()
        };
        let app = AuthServer::new(config, Arc::new(strategy)).router();

        let response = app
            .oneshot(
                Request::post("/whoami")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=jdoe&password=x"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_broken_body_is_bad_request() {
        let options = StrategyOptions {
            integrated: false,
            ..Default::default()
        };
        let app = server(options, accept());

        let chunks = futures::stream::iter(vec![
            Ok("username=jdoe"),
            Err(std::io::Error::other("connection reset")),
        ]);
        let response = app
            .oneshot(
                Request::post("/whoami")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from_stream(chunks))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
