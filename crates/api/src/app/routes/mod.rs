use axum::Router;

use crate::middleware::AuthState;

pub mod auth;
pub mod posts;
pub mod system;
pub mod users;

/// Router for `/api/*` (auth and user administration).
pub fn api_router(auth_state: AuthState) -> Router {
    Router::new()
        .nest("/auth", auth::router(auth_state.clone()))
        .nest("/users", users::router(auth_state))
}
