//! Request extraction that reports failures in the API envelope.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde_json::{Map, Value};

use inkpress_validation::{Payload, RuleSet, sanitize, validate};

use crate::app::errors::ApiError;

/// A JSON request body.
///
/// An empty body, or one sent without a JSON content type, reads as `{}` so
/// field validation can report what is missing. Malformed JSON is a 400.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"));

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Object(Map::new())));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|_| ApiError::bad_request("Invalid JSON payload"))
    }
}

/// The single `:id` path segment, with rejections rendered as the envelope.
#[derive(Debug, Clone)]
pub struct PathParam(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for PathParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<String>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))
    }
}

/// Run `rules` over `payload`; on success return it sanitized.
pub fn validated(
    mut payload: Payload,
    rules: &RuleSet,
    message: &'static str,
) -> Result<Payload, ApiError> {
    let errors = validate(&payload, rules);
    if !errors.is_empty() {
        return Err(ApiError::Validation { message, errors });
    }
    sanitize(&mut payload, rules);
    Ok(payload)
}
