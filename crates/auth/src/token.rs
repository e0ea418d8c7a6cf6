//! Identity token issuance and verification (HS256 JWT).
//!
//! - No IO, no logging: callers decide what to record about failures.
//! - Verification never panics; every failure is a [`TokenError`].

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::claims::{Claims, ClaimsInput, TokenValidationError, validate_claims};

const BEARER_PREFIX: &str = "Bearer ";

/// Why a token was not accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => TokenError::Expired,
            TokenValidationError::NotYetValid => TokenError::NotYetValid,
            TokenValidationError::InvalidTimeWindow => TokenError::Malformed,
        }
    }
}

/// Start-up misconfiguration of the token service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenConfigError {
    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("token time-to-live must be positive")]
    NonPositiveTtl,
}

/// Verification seam used by the HTTP authentication gate.
pub trait TokenVerifier: Send + Sync {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError>;
}

/// Issues and verifies signed, time-limited identity tokens.
///
/// Holds only the read-only secret and TTL established at start-up, so a single
/// instance is shared by every request.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Result<Self, TokenConfigError> {
        if secret.is_empty() {
            return Err(TokenConfigError::MissingSecret);
        }
        if ttl <= chrono::Duration::zero() {
            return Err(TokenConfigError::NonPositiveTtl);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Sign a token for `input`, valid from now for the configured TTL.
    pub fn issue(&self, input: ClaimsInput) -> Result<String, TokenError> {
        self.issue_at(input, Utc::now())
    }

    pub fn issue_at(&self, input: ClaimsInput, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(input, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check structure, signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let decoded = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        validate_claims(&decoded.claims, now)?;
        Ok(decoded.claims)
    }
}

impl TokenVerifier for TokenService {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        TokenService::verify_at(self, token, now)
    }
}

// Expiry is checked by `validate_claims` against an explicit clock.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Parse an `Authorization` header value of the form `Bearer <token>`.
///
/// The prefix is case-sensitive with exactly one space; an empty token is absent.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use inkpress_core::UserId;
    use proptest::prelude::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::hours(24)).unwrap()
    }

    fn input(role: Role) -> ClaimsInput {
        ClaimsInput {
            subject_id: UserId::new(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert_eq!(
            TokenService::new("", Duration::hours(1)).unwrap_err(),
            TokenConfigError::MissingSecret
        );
        assert_eq!(
            TokenService::new("s", Duration::zero()).unwrap_err(),
            TokenConfigError::NonPositiveTtl
        );
    }

    #[test]
    fn issued_token_verifies_to_same_claims() {
        let svc = service("test-secret");
        let input = input(Role::Admin);

        let token = svc.issue(input.clone()).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.input(), input);
        assert_eq!(claims.expires_at - claims.issued_at, Duration::hours(24));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service("test-secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = svc.issue_at(input(Role::User), issued).unwrap();

        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_is_rejected_exactly_at_expiry() {
        let svc = service("test-secret");
        let now = Utc::now();
        let token = svc.issue_at(input(Role::User), now).unwrap();
        let claims = svc.verify_at(&token, now).unwrap();

        assert_eq!(
            svc.verify_at(&token, claims.expires_at),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn different_secret_is_a_signature_mismatch() {
        let token = service("secret-one").issue(input(Role::User)).unwrap();
        assert_eq!(
            service("secret-two").verify(&token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service("test-secret");
        assert_eq!(svc.verify("invalid.token.here"), Err(TokenError::Malformed));
        assert_eq!(svc.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn extract_bearer_cases() {
        assert_eq!(extract_bearer(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(None), None);
        assert_eq!(extract_bearer(Some("")), None);
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(Some("Bearer")), None);
        assert_eq!(extract_bearer(Some("bearer abc")), None);
        assert_eq!(extract_bearer(Some("Basic xyz")), None);
        assert_eq!(extract_bearer(Some("Bearerabc")), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: anything that does not start with the exact prefix is absent.
        #[test]
        fn non_bearer_headers_are_absent(header in "\\PC*") {
            prop_assume!(!header.starts_with("Bearer "));
            prop_assert_eq!(extract_bearer(Some(&header)), None);
        }

        /// Property: a non-empty token after the prefix is returned verbatim.
        #[test]
        fn bearer_token_is_returned_verbatim(token in "[A-Za-z0-9._-]{1,64}") {
            let header = format!("Bearer {token}");
            prop_assert_eq!(extract_bearer(Some(&header)), Some(token.as_str()));
        }

        /// Property: verify(issue(c)) == c for any identity, before expiry.
        #[test]
        fn issue_verify_round_trip(
            email in "[a-z]{1,12}@[a-z]{1,8}\\.[a-z]{2,3}",
            admin in any::<bool>(),
        ) {
            let svc = service("round-trip-secret");
            let input = ClaimsInput {
                subject_id: UserId::new(),
                email,
                role: if admin { Role::Admin } else { Role::User },
            };
            let token = svc.issue(input.clone()).unwrap();
            prop_assert_eq!(svc.verify(&token).unwrap().input(), input);
        }
    }
}
