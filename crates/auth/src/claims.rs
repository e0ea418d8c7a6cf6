use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use inkpress_core::UserId;

use crate::Role;

/// Identity fields a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsInput {
    pub subject_id: UserId,
    pub email: String,
    pub role: Role,
}

/// Decoded token payload.
///
/// Timestamps travel as whole seconds (`iat`/`exp`), so values built by
/// [`Claims::new`] are truncated to the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / user identifier.
    #[serde(rename = "sub")]
    pub subject_id: UserId,

    pub email: String,

    pub role: Role,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn new(input: ClaimsInput, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        let issued_at = truncate_to_seconds(issued_at);
        Self {
            subject_id: input.subject_id,
            email: input.email,
            role: input.role,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn input(&self) -> ClaimsInput {
        ClaimsInput {
            subject_id: self.subject_id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature checks happen in [`crate::TokenService`]; this only looks at timestamps.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims_at(issued_at: DateTime<Utc>, ttl: Duration) -> Claims {
        Claims::new(
            ClaimsInput {
                subject_id: UserId::new(),
                email: "a@b.com".to_string(),
                role: Role::User,
            },
            issued_at,
            ttl,
        )
    }

    #[test]
    fn window_boundaries() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(1));

        assert_eq!(
            validate_claims(&claims, t0 - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(validate_claims(&claims, t0), Ok(()));
        assert_eq!(
            validate_claims(&claims, t0 + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn zero_ttl_is_an_invalid_window() {
        let claims = claims_at(Utc::now(), Duration::zero());
        assert_eq!(
            validate_claims(&claims, Utc::now()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn serialized_with_registered_claim_names() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(24));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["sub"], claims.subject_id.to_string());
        assert_eq!(json["role"], "user");
        assert_eq!(json["iat"], t0.timestamp());
        assert_eq!(json["exp"], t0.timestamp() + 24 * 3600);
    }
}
