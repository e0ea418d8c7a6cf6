use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use inkpress_auth::Role;
use inkpress_core::UserId;
use inkpress_store::StoreError;
use inkpress_validation::Payload;

use crate::app::dto::{self, Pagination, UserView};
use crate::app::errors::ApiError;
use crate::app::extract::{JsonBody, PathParam, validated};
use crate::app::rules::{self, VALIDATION_MESSAGE};
use crate::app::services::AppServices;
use crate::authz::require_role_middleware;
use crate::middleware::{AuthState, auth_middleware};

const LIST_FAILED: &str = "Internal server error while fetching users";
const GET_FAILED: &str = "Internal server error while fetching user";
const UPDATE_FAILED: &str = "Internal server error while updating user";
const DELETE_FAILED: &str = "Internal server error while deleting user";

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

/// User administration. Every route needs a valid token; listing and
/// mutation additionally need the admin role.
pub fn router(auth_state: AuthState) -> Router {
    let admin = from_fn_with_state(Role::Admin, require_role_middleware);

    Router::new()
        .route("/", get(list).route_layer(admin.clone()))
        .route(
            "/:id",
            get(get_user).merge(put(update).delete(delete).route_layer(admin)),
        )
        .route_layer(from_fn_with_state(auth_state, auth_middleware))
}

fn user_id(payload: &Payload) -> Result<UserId, ApiError> {
    payload
        .params
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid user ID"))
}

fn query_number(payload: &Payload, field: &str, default: u32) -> u32 {
    payload
        .query
        .get(field)
        .and_then(|v| v.as_str())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(
        Payload::default().with_query(query),
        &rules::pagination(),
        VALIDATION_MESSAGE,
    )?;
    let page = query_number(&payload, "page", DEFAULT_PAGE);
    let limit = query_number(&payload, "limit", DEFAULT_LIMIT);

    let (users, total) = services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(LIST_FAILED, e))?
        .list(page, limit)
        .await
        .map_err(|e| ApiError::internal(LIST_FAILED, e))?;

    let users: Vec<UserView> = users.iter().map(UserView::full).collect();
    Ok(Json(json!({
        "success": true,
        "data": {
            "users": users,
            "pagination": Pagination::new(page, limit, total),
        },
    })))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    PathParam(id): PathParam,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(
        Payload::default().with_param("id", id),
        &rules::user_id(),
        VALIDATION_MESSAGE,
    )?;
    let id = user_id(&payload)?;

    let user = services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(GET_FAILED, e))?
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal(GET_FAILED, e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "data": { "user": UserView::full(&user) },
    })))
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    PathParam(id): PathParam,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(
        Payload::from_body(body).with_param("id", id),
        &rules::update_user(),
        VALIDATION_MESSAGE,
    )?;
    let id = user_id(&payload)?;

    let users = services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;

    let mut user = users
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    user.apply(dto::user_patch(&payload.body), Utc::now());

    match users.update(&user).await {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::not_found("User not found")),
        Err(StoreError::Duplicate(_)) => {
            return Err(ApiError::bad_request("Duplicate field value entered"));
        }
        Err(e) => return Err(ApiError::internal(UPDATE_FAILED, e)),
    }

    Ok(Json(json!({
        "success": true,
        "message": "User updated successfully",
        "data": { "user": UserView::updated(&user) },
    })))
}

pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    PathParam(id): PathParam,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(
        Payload::default().with_param("id", id),
        &rules::user_id(),
        VALIDATION_MESSAGE,
    )?;
    let id = user_id(&payload)?;

    services
        .db
        .users()
        .await
        .map_err(|e| ApiError::internal(DELETE_FAILED, e))?
        .delete(id)
        .await
        .map_err(|e| ApiError::internal(DELETE_FAILED, e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}
