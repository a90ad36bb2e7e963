//! HTTP boundary for the token proxy: routing, request validation, the
//! refresh cookie and problem responses.

pub mod cookie;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use {
    cookie::RefreshCookieSpec,
    error::ApiError,
    server::{build_router, start_gateway},
    state::AppState,
};
