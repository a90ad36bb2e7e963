use std::sync::Arc;

use {
    axum::{
        extract::{Request, State},
        http::HeaderValue,
        middleware::Next,
        response::Response,
    },
    secrecy::{ExposeSecret, SecretString},
    subtle::ConstantTimeEq,
};

use crate::{error::ApiError, state::AppState};

pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

/// Rejects API calls that did not come through the fronting gateway.
/// A no-op when no gateway secret is configured.
pub async fn require_gateway_secret(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.gateway_secret
        && !secret_matches(req.headers().get(GATEWAY_SECRET_HEADER), expected)
    {
        return Err(ApiError::GatewayAuthFailed);
    }
    Ok(next.run(req).await)
}

/// Constant-time comparison. A missing or non-UTF-8 header never matches.
fn secret_matches(provided: Option<&HeaderValue>, expected: &SecretString) -> bool {
    let Some(provided) = provided.and_then(|v| v.to_str().ok()) else {
        return false;
    };
    provided
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into()
}
