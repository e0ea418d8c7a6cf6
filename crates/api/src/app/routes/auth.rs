use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use inkpress_auth::User;
use inkpress_store::StoreError;
use inkpress_validation::Payload;

use crate::app::dto::{LoginRequest, RegisterRequest, UserView};
use crate::app::errors::ApiError;
use crate::app::extract::{JsonBody, validated};
use crate::app::rules::{self, VALIDATION_MESSAGE};
use crate::app::services::AppServices;
use crate::context::RequestIdentity;
use crate::middleware::{AuthState, auth_middleware};

const REGISTER_FAILED: &str = "Internal server error during registration";
const LOGIN_FAILED: &str = "Internal server error during login";
const PROFILE_FAILED: &str = "Internal server error while fetching profile";

const EMAIL_TAKEN: &str = "User with this email already exists";
const BAD_CREDENTIALS: &str = "Invalid email or password";

pub fn router(auth_state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/profile",
            get(profile).route_layer(from_fn_with_state(auth_state, auth_middleware)),
        )
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(Payload::from_body(body), &rules::register(), VALIDATION_MESSAGE)?;
    let req = RegisterRequest::from_body(&payload.body);

    let users = services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(REGISTER_FAILED, e))?;

    if users
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::internal(REGISTER_FAILED, e))?
        .is_some()
    {
        return Err(ApiError::bad_request(EMAIL_TAKEN));
    }

    let password_hash = services
        .hash_password(req.password)
        .await
        .map_err(|e| ApiError::internal(REGISTER_FAILED, format!("{e:#}")))?;
    let user = User::new(&req.email, password_hash, &req.name, req.role, Utc::now());

    match users.create(&user).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration of the same email.
        Err(StoreError::Duplicate(_)) => return Err(ApiError::bad_request(EMAIL_TAKEN)),
        Err(e) => return Err(ApiError::internal(REGISTER_FAILED, e)),
    }

    let token = services
        .tokens
        .issue(user.claims_input())
        .map_err(|e| ApiError::internal(REGISTER_FAILED, e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": {
                "user": UserView::summary(&user),
                "token": token,
            },
        })),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(Payload::from_body(body), &rules::login(), VALIDATION_MESSAGE)?;
    let req = LoginRequest::from_body(&payload.body);

    let users = services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(LOGIN_FAILED, e))?;

    let user = users
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::internal(LOGIN_FAILED, e))?;

    // Unknown email, inactive account and wrong password look the same to clients.
    let Some(user) = user.filter(|u| u.is_active) else {
        warn!(email = %req.email, "login rejected");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    let matches = services
        .verify_password(req.password, user.password_hash.clone())
        .await
        .map_err(|e| ApiError::internal(LOGIN_FAILED, format!("{e:#}")))?;
    if !matches {
        warn!(email = %req.email, "login rejected");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let token = services
        .tokens
        .issue(user.claims_input())
        .map_err(|e| ApiError::internal(LOGIN_FAILED, e))?;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": UserView::summary(&user),
            "token": token,
        },
    })))
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    let user = services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(PROFILE_FAILED, e))?
        .find_by_id(identity.user_id())
        .await
        .map_err(|e| ApiError::internal(PROFILE_FAILED, e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "data": { "user": UserView::profile(&user) },
    })))
}
