//! HTTP API: server wiring, the authentication and authorization gates, and
//! request/response mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
