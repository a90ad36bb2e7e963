use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    secrecy::SecretString,
    tracing::{debug, info},
};

use crate::schema::TokenProxyConfig;

const CONFIG_STEM: &str = "tokenproxy";
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml"];

/// Find a config file: `./tokenproxy.{toml,yaml,yml}` first, then the
/// per-user config directory.
pub fn discover_config_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(project) = directories::ProjectDirs::from("", "", CONFIG_STEM) {
        dirs.push(project.config_dir().to_path_buf());
    }
    find_in_dirs(&dirs)
}

fn find_in_dirs(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| {
            CONFIG_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("{CONFIG_STEM}.{ext}")))
        })
        .find(|candidate| candidate.is_file())
}

/// Load, overlay with process environment, and validate.
pub fn load_config(path: &Path) -> anyhow::Result<TokenProxyConfig> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env<F>(path: &Path, env: F) -> anyhow::Result<TokenProxyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut config = parse(&raw, path)?;
    apply_env_overrides(&mut config, env);
    config
        .validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;

    info!(path = %path.display(), "loaded token proxy config");
    Ok(config)
}

fn parse(raw: &str, path: &Path) -> anyhow::Result<TokenProxyConfig> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(raw)
            .with_context(|| format!("failed to parse YAML config {}", path.display())),
        "toml" => toml::from_str(raw)
            .with_context(|| format!("failed to parse TOML config {}", path.display())),
        other => anyhow::bail!("unsupported config extension '.{other}' for {}", path.display()),
    }
}

fn apply_env_overrides<F>(config: &mut TokenProxyConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let apply = |key: &str, target: &mut String| {
        if let Some(value) = env(key) {
            debug!(key, "config value overridden from environment");
            *target = value;
        }
    };
    apply("TOKENPROXY_SERVER_URL", &mut config.provider.server_url);
    apply("TOKENPROXY_REALM", &mut config.provider.realm);
    apply("TOKENPROXY_CLIENT_ID", &mut config.provider.client_id);
    apply(
        "TOKENPROXY_ALLOWED_REDIRECT_PREFIX",
        &mut config.policy.allowed_redirect_prefix,
    );

    if let Some(secret) = env("TOKENPROXY_CLIENT_SECRET") {
        debug!(key = "TOKENPROXY_CLIENT_SECRET", "config value overridden from environment");
        config.provider.client_secret = SecretString::new(secret);
    }
    if let Some(secret) = env("TOKENPROXY_GATEWAY_SECRET") {
        debug!(key = "TOKENPROXY_GATEWAY_SECRET", "config value overridden from environment");
        config.server.gateway_secret = Some(SecretString::new(secret));
    }
    if let Some(hints) = env("TOKENPROXY_ALLOWED_IDP_HINTS") {
        debug!(key = "TOKENPROXY_ALLOWED_IDP_HINTS", "config value overridden from environment");
        config.policy.allowed_idp_hints = hints
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .collect();
    }
}
