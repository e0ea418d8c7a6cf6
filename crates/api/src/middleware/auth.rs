use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, warn};

use inkpress_auth::{Claims, TokenVerifier, extract_bearer};

use crate::app::errors::json_error;
use crate::context::RequestIdentity;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
}

/// Why a request was turned away by the authentication gate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("Authorization header is required")]
    MissingHeader,

    #[error("Invalid token format")]
    InvalidFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Internal server error during authentication")]
    Internal,
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Decide the authentication outcome for one `Authorization` header value.
pub fn authenticate(
    header: Option<&HeaderValue>,
    tokens: &dyn TokenVerifier,
    now: DateTime<Utc>,
) -> Result<Claims, AuthRejection> {
    let header = header.ok_or(AuthRejection::MissingHeader)?;
    // Non-UTF-8 bytes cannot carry a bearer token.
    let token = extract_bearer(header.to_str().ok()).ok_or(AuthRejection::InvalidFormat)?;

    tokens.verify_at(token, now).map_err(|e| {
        warn!(reason = %e, "token verification failed");
        AuthRejection::InvalidToken
    })
}

/// Authentication gate.
///
/// Attaches [`RequestIdentity`] on success; otherwise answers 401 (or 500 if
/// verification itself panicked) and never reaches the handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        authenticate(
            req.headers().get(AUTHORIZATION),
            state.tokens.as_ref(),
            Utc::now(),
        )
    }))
    .unwrap_or_else(|_| {
        error!(path = %req.uri().path(), "authentication gate panicked");
        Err(AuthRejection::Internal)
    });

    match outcome {
        Ok(claims) => {
            req.extensions_mut().insert(RequestIdentity::new(claims));
            next.run(req).await
        }
        Err(rejection) => {
            if rejection != AuthRejection::Internal {
                warn!(path = %req.uri().path(), reason = %rejection, "request not authenticated");
            }
            json_error(rejection.status(), rejection.to_string())
        }
    }
}
