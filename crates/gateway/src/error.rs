use {
    axum::{
        Json,
        http::{StatusCode, header},
        response::{IntoResponse, Response},
    },
    serde::Serialize,
    tokenproxy_oauth::TokenError,
    tracing::{error, info, warn},
};

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Problem details body (RFC 7807).
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body or blank field, rejected before the core is involved.
    #[error("invalid request: {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    #[error("gateway authentication failed")]
    GatewayAuthFailed,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::GatewayAuthFailed => StatusCode::FORBIDDEN,
            Self::Token(TokenError::NotAllowed { .. }) => StatusCode::BAD_REQUEST,
            Self::Token(TokenError::MissingCredential | TokenError::BadCredential { .. }) => {
                StatusCode::UNAUTHORIZED
            },
            Self::Token(TokenError::UpstreamUnavailable { .. }) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Caller-facing body. Upstream diagnostics never appear here.
    pub fn problem(&self) -> Problem {
        let status = self.status().as_u16();
        let (title, detail, field, reasons) = match self {
            Self::InvalidRequest { field, reason } => (
                "Invalid Request",
                reason.clone(),
                Some(field.to_string()),
                vec![reason.clone()],
            ),
            Self::GatewayAuthFailed => (
                "Gateway Authentication Failed",
                "Gateway authentication failed".to_string(),
                None,
                Vec::new(),
            ),
            Self::Token(TokenError::NotAllowed { field, reason }) => (
                "Not Allowed",
                reason.clone(),
                Some(field.to_string()),
                vec![reason.clone()],
            ),
            Self::Token(TokenError::MissingCredential) => (
                "Refresh Cookie Not Found",
                "Refresh cookie not found. Please login again.".to_string(),
                None,
                Vec::new(),
            ),
            Self::Token(TokenError::BadCredential { .. }) => (
                "Bad Token",
                "The provided token is invalid or malformed.".to_string(),
                None,
                Vec::new(),
            ),
            Self::Token(TokenError::UpstreamUnavailable { .. }) => (
                "Identity Provider Unavailable",
                "The identity provider is unavailable. Please try again later.".to_string(),
                None,
                Vec::new(),
            ),
        };
        Problem {
            kind: "about:blank",
            title,
            status,
            detail,
            field,
            reasons,
        }
    }

    fn log(&self) {
        match self {
            Self::InvalidRequest { field, reason } => info!(field, %reason, "rejected request"),
            Self::GatewayAuthFailed => warn!("gateway secret missing or mismatched"),
            Self::Token(TokenError::NotAllowed { field, reason }) => {
                warn!(field, %reason, "request outside allow-list")
            },
            Self::Token(TokenError::MissingCredential) => info!("refresh cookie not found"),
            Self::Token(TokenError::BadCredential { upstream_message }) => {
                warn!(upstream = %upstream_message, "identity provider rejected credential")
            },
            Self::Token(TokenError::UpstreamUnavailable { reason }) => {
                error!(%reason, "identity provider unavailable")
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self.problem()),
        )
            .into_response()
    }
}
