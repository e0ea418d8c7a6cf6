use thiserror::Error;

use crate::{Claims, Role};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// No identity was attached to the request.
    #[error("User not authenticated")]
    Unauthenticated,

    /// Identity present, but with a different role.
    #[error("Access denied. {} role required", .required.label())]
    Forbidden { required: Role },
}

/// Single-role gate: allow only identities whose role equals `required`.
///
/// - No IO
/// - No panics
/// - Total over [`Role`]
pub fn require_role(identity: Option<&Claims>, required: Role) -> Result<(), AuthzError> {
    let Some(claims) = identity else {
        return Err(AuthzError::Unauthenticated);
    };

    match (claims.role, required) {
        (Role::Admin, Role::Admin) | (Role::User, Role::User) => Ok(()),
        (Role::User, Role::Admin) | (Role::Admin, Role::User) => {
            Err(AuthzError::Forbidden { required })
        }
    }
}
