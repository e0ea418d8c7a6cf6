//! Request middleware: the authentication gate plus the edge layers
//! (rate limiting, request logging, security headers, error detail).

pub mod auth;
pub mod error_detail;
pub mod logging;
pub mod rate_limit;
pub mod security_headers;

pub use auth::{AuthRejection, AuthState, auth_middleware, authenticate};
pub use error_detail::expose_error_detail;
pub use logging::request_logging;
pub use rate_limit::{RateLimitConfig, RateLimitLayer, rate_limit_middleware};
pub use security_headers::with_security_headers;
