use std::sync::Arc;

use axum::{
    extract::{Extension, OriginalUri},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::app::errors::json_error;
use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Blog API Server is running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "environment": services.environment.as_str(),
    }))
}

pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
    json_error(StatusCode::NOT_FOUND, format!("Route {target} not found"))
}
