use std::fmt;

/// A browser's request to be sent to the provider's authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    pub redirect_uri: String,
    pub code_challenge: String,
    pub idp_hint: String,
}

/// Callback payload, redeemable upstream exactly once.
#[derive(Clone)]
pub struct ExchangeRequest {
    pub authorization_code: String,
    pub pkce_verifier: String,
    pub redirect_uri: String,
}

impl fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("authorization_code", &"[REDACTED]")
            .field("pkce_verifier", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Tokens returned by an exchange or refresh.
///
/// Never stored: the access token goes back in the response body and the
/// refresh token only ever travels in the refresh cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_expires_in: i64,
    pub refresh_token: String,
    pub refresh_token_expires_in: i64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .field("refresh_token", &"[REDACTED]")
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish()
    }
}

/// PKCE challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}
