//! Public blog post routes (no gates).

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use inkpress_core::{DomainError, PostId};
use inkpress_posts::Post;
use inkpress_validation::Payload;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::{JsonBody, PathParam, validated};
use crate::app::rules::{self, POST_VALIDATION_MESSAGE};
use crate::app::services::AppServices;

const FAILED: &str = "Internal server error";
const NOT_FOUND: &str = "Blog post not found";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(delete))
}

fn post_id(raw: &str) -> Result<PostId, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid ID format"))
}

fn rejected(err: DomainError) -> ApiError {
    ApiError::bad_request(err.to_string())
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = services
        .db
        .posts()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .all()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    Ok(Json(posts))
}

pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    PathParam(id): PathParam,
) -> Result<impl IntoResponse, ApiError> {
    let id = post_id(&id)?;
    let post = services
        .db
        .posts()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .find(id)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(Json(post))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validated(Payload::from_body(body), &rules::post(), POST_VALIDATION_MESSAGE)?;
    let post = Post::create(dto::post_draft(&payload.body), Utc::now()).map_err(rejected)?;

    services
        .db
        .posts()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .create(&post)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    PathParam(id): PathParam,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let id = post_id(&id)?;
    let payload = validated(Payload::from_body(body), &rules::post(), POST_VALIDATION_MESSAGE)?;

    let posts = services
        .db
        .posts()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    let mut post = posts
        .find(id)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    post.revise(dto::post_draft(&payload.body), Utc::now())
        .map_err(rejected)?;

    if !posts
        .update(&post)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(Json(post))
}

pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    PathParam(id): PathParam,
) -> Result<impl IntoResponse, ApiError> {
    let id = post_id(&id)?;
    services
        .db
        .posts()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .delete(id)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(json!({
        "success": true,
        "message": "Blog post deleted successfully",
    })))
}
