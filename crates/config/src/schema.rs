use {
    secrecy::{ExposeSecret, SecretString},
    serde::Deserialize,
};

// ── Top-level ────────────────────────────────────────────────────────────────

/// Full proxy configuration as read from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub policy: PolicyConfig,
    #[serde(default)]
    pub refresh_cookie: RefreshCookieConfig,
}

impl TokenProxyConfig {
    /// Reject configurations the proxy cannot run safely with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.provider.validate()?;
        self.policy.validate()?;
        self.refresh_cookie.validate()?;
        if let Some(secret) = &self.server.gateway_secret
            && secret.expose_secret().trim().is_empty()
        {
            anyhow::bail!("server.gateway_secret must not be empty when set");
        }
        Ok(())
    }
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret the fronting gateway sends in `X-Gateway-Secret`.
    /// The check is disabled when unset.
    #[serde(default)]
    pub gateway_secret: Option<SecretString>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            gateway_secret: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8080
}

// ── Identity provider ────────────────────────────────────────────────────────

/// How a revoke call that timed out is reported to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevokeTimeoutPolicy {
    /// Surface the timeout as an upstream failure.
    #[default]
    Fail,
    /// Log it and report logout as successful.
    Tolerate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the identity provider, e.g. `https://sso.example.com`.
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Upper bound for every upstream round trip.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub revoke_timeout: RevokeTimeoutPolicy,
    /// Retry a failed revoke once before giving up.
    #[serde(default = "default_revoke_retry")]
    pub revoke_retry: bool,
}

impl ProviderConfig {
    fn validate(&self) -> anyhow::Result<()> {
        require_non_empty("provider.server_url", &self.server_url)?;
        require_non_empty("provider.realm", &self.realm)?;
        require_non_empty("provider.client_id", &self.client_id)?;
        require_non_empty("provider.client_secret", self.client_secret.expose_secret())?;

        let parsed = url::Url::parse(&self.server_url).map_err(|e| {
            anyhow::anyhow!("provider.server_url '{}' is not a valid URL: {e}", self.server_url)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!(
                "provider.server_url must use http or https, got '{}'",
                parsed.scheme()
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_revoke_retry() -> bool {
    true
}

// ── Allow-list policy ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub allowed_redirect_prefix: String,
    #[serde(default)]
    pub allowed_idp_hints: Vec<String>,
}

impl PolicyConfig {
    fn validate(&self) -> anyhow::Result<()> {
        require_non_empty("policy.allowed_redirect_prefix", &self.allowed_redirect_prefix)?;
        if self.allowed_idp_hints.is_empty() {
            anyhow::bail!("policy.allowed_idp_hints must list at least one hint");
        }
        if self.allowed_idp_hints.iter().any(|h| h.trim().is_empty()) {
            anyhow::bail!("policy.allowed_idp_hints must not contain blank entries");
        }
        Ok(())
    }
}

// ── Refresh cookie ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshCookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    #[serde(default = "default_cookie_max_age")]
    pub max_age_secs: i64,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for RefreshCookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            max_age_secs: default_cookie_max_age(),
            path: default_cookie_path(),
            domain: None,
        }
    }
}

impl RefreshCookieConfig {
    fn validate(&self) -> anyhow::Result<()> {
        require_non_empty("refresh_cookie.name", &self.name)?;
        require_non_empty("refresh_cookie.path", &self.path)?;
        if self.max_age_secs < 0 {
            anyhow::bail!("refresh_cookie.max_age_secs must not be negative");
        }
        Ok(())
    }
}

fn default_cookie_name() -> String {
    "TOKENPROXY_REFRESH_TOKEN".into()
}

fn default_cookie_max_age() -> i64 {
    // 14 days
    1_209_600
}

fn default_cookie_path() -> String {
    "/".into()
}

fn require_non_empty(field: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{field} must not be empty");
    }
    Ok(())
}
