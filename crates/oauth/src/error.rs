use thiserror::Error;

/// Failures of the token lifecycle, classified once where they happen and
/// passed through unchanged to the HTTP boundary.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A redirect URI or idp hint outside the configured policy.
    #[error("{field} is not allowed: {reason}")]
    NotAllowed { field: &'static str, reason: String },

    /// No refresh token cookie on a refresh or logout.
    #[error("refresh token cookie not found")]
    MissingCredential,

    /// The provider rejected the code or refresh token. `upstream_message`
    /// is for logs only and is kept out of `Display`.
    #[error("the provided token is invalid or malformed")]
    BadCredential { upstream_message: String },

    /// Upstream 5xx, network failure, timeout, or an unreadable response.
    #[error("identity provider unavailable: {reason}")]
    UpstreamUnavailable { reason: String },
}

impl TokenError {
    pub fn not_allowed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::NotAllowed {
            field,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_credential_display_hides_upstream_message() {
        let err = TokenError::BadCredential {
            upstream_message: "HTTP 400: {\"error\":\"invalid_grant\"}".into(),
        };
        let shown = err.to_string();
        assert!(!shown.contains("invalid_grant"));
        assert_eq!(shown, "the provided token is invalid or malformed");
    }

    #[test]
    fn not_allowed_names_the_field() {
        let err = TokenError::not_allowed("redirect_uri", "must start with https://app");
        assert!(err.to_string().starts_with("redirect_uri is not allowed"));
    }
}
