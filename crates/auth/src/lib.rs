//! `inkpress-auth`: identity tokens, role gating and credentials.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, require_role};
pub use claims::{Claims, ClaimsInput, TokenValidationError, validate_claims};
pub use password::{PasswordError, PasswordHasher};
pub use roles::{Role, UnknownRole};
pub use token::{TokenConfigError, TokenError, TokenService, TokenVerifier, extract_bearer};
pub use user::{User, UserPatch};
