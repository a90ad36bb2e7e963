//! Keycloak realm adapter speaking plain OIDC endpoints.
//!
//! Endpoints are derived from `{server_url}/realms/{realm}/protocol/openid-connect/`.

use std::time::Duration;

use {
    anyhow::Context,
    async_trait::async_trait,
    reqwest::StatusCode,
    secrecy::{ExposeSecret, SecretString},
    serde::Deserialize,
    tokenproxy_config::{ProviderConfig, RevokeTimeoutPolicy},
    tracing::{debug, error, warn},
    url::Url,
};

use crate::{
    error::TokenError,
    provider::IdentityProvider,
    types::{ExchangeRequest, RedirectRequest, TokenPair},
};

/// Token endpoint payload. Unknown fields (`token_type`, `scope`,
/// `not-before-policy`, ...) are ignored.
#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: String,
    #[serde(default)]
    refresh_expires_in: i64,
}

impl From<TokenEndpointResponse> for TokenPair {
    fn from(res: TokenEndpointResponse) -> Self {
        Self {
            access_token: res.access_token,
            access_token_expires_in: res.expires_in,
            refresh_token: res.refresh_token,
            refresh_token_expires_in: res.refresh_expires_in,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RevokeFailure {
    #[error("logout request timed out: {0}")]
    TimedOut(String),
    #[error("{0}")]
    Unavailable(String),
}

pub struct KeycloakProvider {
    client_id: String,
    client_secret: SecretString,
    auth_url: Url,
    token_url: Url,
    logout_url: Url,
    revoke_timeout: RevokeTimeoutPolicy,
    revoke_attempts: u32,
    http: reqwest::Client,
}

impl KeycloakProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&config.server_url)
            .with_context(|| format!("invalid provider server_url '{}'", config.server_url))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build identity provider HTTP client")?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: realm_endpoint(&base, &config.realm, "auth")?,
            token_url: realm_endpoint(&base, &config.realm, "token")?,
            logout_url: realm_endpoint(&base, &config.realm, "logout")?,
            revoke_timeout: config.revoke_timeout,
            revoke_attempts: if config.revoke_retry { 2 } else { 1 },
            http,
        })
    }

    pub fn authorization_endpoint(&self) -> &Url {
        &self.auth_url
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_url
    }

    pub fn logout_endpoint(&self) -> &Url {
        &self.logout_url
    }

    async fn request_tokens(
        &self,
        grant: &'static str,
        form: &[(&str, &str)],
    ) -> Result<TokenPair, TokenError> {
        let response = self
            .http
            .post(self.token_url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| {
                error!(
                    grant,
                    timeout = e.is_timeout(),
                    error = %e,
                    "token request to identity provider failed"
                );
                TokenError::unavailable(format!("token request failed: {e}"))
            })?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            let body = response.text().await.unwrap_or_default();
            debug!(grant, %status, "identity provider rejected credential");
            return Err(TokenError::BadCredential {
                upstream_message: format!("HTTP {status}: {body}"),
            });
        }
        if !status.is_success() {
            error!(grant, %status, "identity provider returned an unexpected status");
            return Err(TokenError::unavailable(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let body: TokenEndpointResponse = response.json().await.map_err(|e| {
            error!(grant, error = %e, "unreadable token response from identity provider");
            TokenError::unavailable(format!("unreadable token response: {e}"))
        })?;

        debug!(grant, expires_in = body.expires_in, "identity provider issued tokens");
        Ok(body.into())
    }

    async fn revoke_once(&self, refresh_token: &str) -> Result<(), RevokeFailure> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http
            .post(self.logout_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RevokeFailure::TimedOut(e.to_string())
                } else {
                    RevokeFailure::Unavailable(format!("logout request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "refresh token revoked");
            return Ok(());
        }
        if status.is_client_error() {
            // Already expired or otherwise invalid upstream; logout still succeeds.
            let body = response.text().await.unwrap_or_default();
            warn!(
                %status,
                upstream = %body,
                "identity provider refused revoke, token already invalid"
            );
            return Ok(());
        }
        Err(RevokeFailure::Unavailable(format!(
            "logout endpoint returned HTTP {status}"
        )))
    }
}

fn realm_endpoint(base: &Url, realm: &str, leaf: &str) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("provider server_url '{base}' cannot carry a path"))?
        .pop_if_empty()
        .extend(["realms", realm, "protocol", "openid-connect", leaf]);
    Ok(url)
}

#[async_trait]
impl IdentityProvider for KeycloakProvider {
    fn name(&self) -> &str {
        "keycloak"
    }

    fn authorization_uri(&self, request: &RedirectRequest) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &request.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid")
            .append_pair("code_challenge", &request.code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("kc_idp_hint", &request.idp_hint);
        url.into()
    }

    async fn exchange(&self, request: &ExchangeRequest) -> Result<TokenPair, TokenError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("code", request.authorization_code.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
            ("code_verifier", request.pkce_verifier.as_str()),
        ];
        self.request_tokens("authorization_code", &form).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("refresh_token", refresh_token),
        ];
        self.request_tokens("refresh_token", &form).await
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), TokenError> {
        let mut attempt = 1;
        loop {
            match self.revoke_once(refresh_token).await {
                Ok(()) => return Ok(()),
                Err(failure) if attempt < self.revoke_attempts => {
                    warn!(attempt, reason = %failure, "revoke failed, retrying");
                    attempt += 1;
                },
                Err(RevokeFailure::TimedOut(reason))
                    if self.revoke_timeout == RevokeTimeoutPolicy::Tolerate =>
                {
                    warn!(%reason, "revoke timed out, reporting logout as successful");
                    return Ok(());
                },
                Err(failure) => {
                    error!(reason = %failure, "revoke failed");
                    return Err(TokenError::unavailable(failure.to_string()));
                },
            }
        }
    }
}
