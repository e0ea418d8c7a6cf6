//! Role gate for routes.
//!
//! Runs after the authentication gate and checks the attached identity's role.

use std::panic::{AssertUnwindSafe, catch_unwind};

use axum::{
    extract::State,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use inkpress_auth::{AuthzError, Role, require_role};

use crate::app::errors::json_error;
use crate::context::RequestIdentity;

/// Authorization gate. Use with `from_fn_with_state(Role::Admin, require_role_middleware)`.
pub async fn require_role_middleware(
    State(required): State<Role>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let identity = req.extensions().get::<RequestIdentity>();
        require_role(identity.map(RequestIdentity::claims), required)
    }));

    match outcome {
        Ok(Ok(())) => next.run(req).await,
        Ok(Err(e)) => {
            let status = match e {
                AuthzError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthzError::Forbidden { .. } => StatusCode::FORBIDDEN,
            };
            warn!(path = %req.uri().path(), required = %required, reason = %e, "request not authorized");
            json_error(status, e.to_string())
        }
        Err(_) => {
            error!(path = %req.uri().path(), "authorization gate panicked");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during authorization",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, routing::get};
    use chrono::Utc;
    use inkpress_auth::{Claims, ClaimsInput};
    use inkpress_core::UserId;
    use tower::ServiceExt;

    fn identity(role: Role) -> RequestIdentity {
        RequestIdentity::new(Claims::new(
            ClaimsInput {
                subject_id: UserId::new(),
                email: "a@b.com".into(),
                role,
            },
            Utc::now(),
            chrono::Duration::hours(1),
        ))
    }

    async fn call(identity: Option<RequestIdentity>) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .route("/", get(|| async { axum::Json(serde_json::json!({"ran": true})) }))
            .layer(axum::middleware::from_fn_with_state(
                Role::Admin,
                require_role_middleware,
            ));

        let mut req = axum::http::Request::builder().uri("/").body(Body::empty()).unwrap();
        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn admin_passes() {
        let (status, body) = call(Some(identity(Role::Admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ran"], true);
    }

    #[tokio::test]
    async fn user_is_forbidden() {
        let (status, body) = call(Some(identity(Role::User))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied. Admin role required");
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let (status, body) = call(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "User not authenticated");
    }
}
