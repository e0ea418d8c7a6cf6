//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared handler dependencies (database, tokens, hashing)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `rules.rs`: per-route validation rule sets
//! - `extract.rs`: JSON body extraction and the validation step
//! - `dto.rs`: request mapping and response views
//! - `errors.rs`: consistent error responses

use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{from_fn, from_fn_with_state},
    response::Response,
    routing::get,
    Extension, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
};

use inkpress_store::Database;

use crate::config::AppConfig;
use crate::middleware::{self, AuthState, RateLimitConfig, RateLimitLayer};

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod rules;
pub mod services;

use errors::{ErrorDetail, json_error};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(config: &AppConfig, db: Database) -> anyhow::Result<Router> {
    let services = Arc::new(services::AppServices::new(config, db)?);
    let auth_state = AuthState {
        tokens: services.tokens.clone(),
    };

    let limiter = RateLimitLayer::new(RateLimitConfig {
        max_requests: config.rate_limit_max_requests,
        window: config.rate_limit_window,
    });
    limiter.spawn_cleanup();

    // Only `/api/*` is rate limited.
    let api = routes::api_router(auth_state)
        .layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .nest("/posts", routes::posts::router())
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response));

    if !config.environment.is_production() {
        app = app.layer(from_fn(middleware::expose_error_detail));
    }

    let app = middleware::with_security_headers(app)
        .layer(cors(&config.cors_origins)?)
        .layer(CompressionLayer::new())
        .layer(from_fn(middleware::request_logging));

    Ok(app)
}

fn cors(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        // Credentials rule out a literal `*`; echo the caller's origin instead.
        AllowOrigin::mirror_request()
    } else {
        let origins = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());
    tracing::error!(error = %detail, "request handler panicked");

    let mut res = json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    res.extensions_mut().insert(ErrorDetail(detail));
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::Environment;

    async fn json(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app(environment: Environment) -> Router {
        let mut config = AppConfig::for_tests("unit-secret");
        config.environment = environment;
        build_app(&config, Database::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_environment_with_security_headers() {
        let res = app(Environment::Test)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");

        let body = json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["environment"], "test");
    }

    #[tokio::test]
    async fn unknown_routes_get_the_envelope() {
        let res = app(Environment::Test)
            .oneshot(Request::builder().uri("/nope?x=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(res).await["message"], "Route /nope?x=1 not found");
    }

    #[tokio::test]
    async fn panics_become_500_envelopes() {
        let res = panic_response(Box::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.extensions().get::<ErrorDetail>(),
            Some(&ErrorDetail("boom".into()))
        );
        assert_eq!(json(res).await["message"], "Internal server error");
    }

    #[test]
    fn wildcard_and_listed_origins_both_build() {
        assert!(cors(&["*".to_string()]).is_ok());
        assert!(cors(&["http://a.test".to_string(), "http://b.test".to_string()]).is_ok());
        assert!(cors(&["bad\norigin".to_string()]).is_err());
    }
}
