use inkpress_auth::Claims;
use inkpress_core::UserId;

/// Authenticated identity for a request.
///
/// Inserted into request extensions by the authentication gate; handlers
/// extract it with `Extension<RequestIdentity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    claims: Claims,
}

impl RequestIdentity {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.subject_id
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
