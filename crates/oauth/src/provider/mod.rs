pub mod keycloak;

use async_trait::async_trait;

use crate::{
    error::TokenError,
    types::{ExchangeRequest, RedirectRequest, TokenPair},
};

/// Upstream identity provider. The only place network I/O against the
/// provider happens; failures come back already classified.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider family identifier (e.g. "keycloak").
    fn name(&self) -> &str;

    /// Build the authorization endpoint URL. Pure, no allow-list checks.
    fn authorization_uri(&self, request: &RedirectRequest) -> String;

    /// Redeem an authorization code (`grant_type=authorization_code`).
    async fn exchange(&self, request: &ExchangeRequest) -> Result<TokenPair, TokenError>;

    /// Rotate a refresh token (`grant_type=refresh_token`).
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError>;

    /// Invalidate a refresh token. A token the provider already considers
    /// invalid is not an error.
    async fn revoke(&self, refresh_token: &str) -> Result<(), TokenError>;
}
