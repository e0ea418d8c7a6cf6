//! Adds internal error detail to 500 bodies outside production.

use axum::{
    body::{Body, to_bytes},
    http::{Request, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::app::errors::ErrorDetail;

/// Error envelopes are small; anything larger is passed through untouched.
const MAX_ENVELOPE_BYTES: usize = 64 * 1024;

/// Copy an [`ErrorDetail`] response extension into the JSON body as `error`.
///
/// Install only for non-production environments.
pub async fn expose_error_detail(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ENVELOPE_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let mut value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };
    if let Some(obj) = value.as_object_mut() {
        obj.insert("error".to_string(), Value::String(detail));
    }

    match serde_json::to_vec(&value) {
        Ok(body) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
