use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    error::TokenError,
    policy::{Policy, validate_idp_hint, validate_redirect},
    provider::IdentityProvider,
    types::{ExchangeRequest, RedirectRequest, TokenPair},
};

/// Validates inputs against the [`Policy`] and forwards to the provider.
///
/// Holds no per-session state; every call stands alone.
pub struct TokenProxy {
    provider: Arc<dyn IdentityProvider>,
    policy: Policy,
}

impl TokenProxy {
    pub fn new(provider: Arc<dyn IdentityProvider>, policy: Policy) -> Self {
        Self { provider, policy }
    }

    #[instrument(skip_all, fields(provider = self.provider.name(), idp_hint = %request.idp_hint))]
    pub fn generate_authorization_uri(
        &self,
        request: &RedirectRequest,
    ) -> Result<String, TokenError> {
        validate_redirect(&request.redirect_uri, &self.policy)?;
        validate_idp_hint(&request.idp_hint, &self.policy)?;
        debug!("building authorization uri");
        Ok(self.provider.authorization_uri(request))
    }

    /// The idp hint was already recorded upstream during authorization, so
    /// only the redirect is checked here.
    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn exchange(&self, request: &ExchangeRequest) -> Result<TokenPair, TokenError> {
        validate_redirect(&request.redirect_uri, &self.policy)?;
        self.provider.exchange(request).await
    }

    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        if refresh_token.is_empty() {
            return Err(TokenError::MissingCredential);
        }
        self.provider.refresh(refresh_token).await
    }

    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), TokenError> {
        if refresh_token.is_empty() {
            return Err(TokenError::MissingCredential);
        }
        self.provider.revoke(refresh_token).await
    }
}
