use std::sync::Arc;

use {
    secrecy::SecretString,
    tokenproxy_config::TokenProxyConfig,
    tokenproxy_oauth::{KeycloakProvider, Policy, TokenProxy},
};

use crate::cookie::RefreshCookieSpec;

/// Read-only state shared by all handlers.
pub struct AppState {
    pub proxy: TokenProxy,
    pub refresh_cookie: RefreshCookieSpec,
    pub gateway_secret: Option<SecretString>,
}

impl AppState {
    pub fn new(
        proxy: TokenProxy,
        refresh_cookie: RefreshCookieSpec,
        gateway_secret: Option<SecretString>,
    ) -> Self {
        Self {
            proxy,
            refresh_cookie,
            gateway_secret,
        }
    }

    pub fn from_config(config: &TokenProxyConfig) -> anyhow::Result<Self> {
        let provider = Arc::new(KeycloakProvider::new(&config.provider)?);
        let proxy = TokenProxy::new(provider, Policy::from_config(&config.policy));
        Ok(Self::new(
            proxy,
            RefreshCookieSpec::from_config(&config.refresh_cookie),
            config.server.gateway_secret.clone(),
        ))
    }
}
