use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    secrecy::ExposeSecret,
    tokenproxy_config::{TokenProxyConfig, discover_config_file, load_config},
    tokenproxy_oauth::{KeycloakProvider, Policy},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Load and validate the config, then print a redacted summary.
    Check {
        #[arg(long, env = "TOKENPROXY_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the identity provider endpoints the config resolves to.
    Show {
        #[arg(long, env = "TOKENPROXY_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check { config } => {
            let config = load(config.as_deref())?;
            print!("{}", summary(&config));
            println!("config OK");
            Ok(())
        },
        ConfigAction::Show { config } => {
            let config = load(config.as_deref())?;
            print!("{}", endpoints(&config)?);
            Ok(())
        },
    }
}

/// Load from an explicit path or fall back to discovery.
pub fn load(path: Option<&Path>) -> Result<TokenProxyConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => discover_config_file()
            .context("no config file found; pass --config or create ./tokenproxy.toml")?,
    };
    load_config(&path)
}

fn summary(config: &TokenProxyConfig) -> String {
    let policy = Policy::from_config(&config.policy);
    let hints: Vec<&str> = policy
        .allowed_idp_hints()
        .iter()
        .map(String::as_str)
        .collect();

    let mut out = String::new();
    out.push_str(&format!(
        "listen:           {}:{}\n",
        config.server.bind, config.server.port
    ));
    out.push_str(&format!(
        "gateway secret:   {}\n",
        redacted(config.server.gateway_secret.as_ref().map(|s| s.expose_secret().as_str()))
    ));
    out.push_str(&format!("provider:         {}\n", config.provider.server_url));
    out.push_str(&format!("realm:            {}\n", config.provider.realm));
    out.push_str(&format!("client id:        {}\n", config.provider.client_id));
    out.push_str(&format!(
        "client secret:    {}\n",
        redacted(Some(config.provider.client_secret.expose_secret().as_str()))
    ));
    out.push_str(&format!(
        "redirect prefix:  {}\n",
        policy.allowed_redirect_prefix()
    ));
    out.push_str(&format!("idp hints:        {}\n", hints.join(", ")));
    out.push_str(&format!(
        "refresh cookie:   {} (max-age {}s, path {})\n",
        config.refresh_cookie.name, config.refresh_cookie.max_age_secs, config.refresh_cookie.path
    ));
    out
}

fn endpoints(config: &TokenProxyConfig) -> Result<String> {
    let provider = KeycloakProvider::new(&config.provider)?;
    Ok(format!(
        "authorize: {}\ntoken:     {}\nlogout:    {}\n",
        provider.authorization_endpoint(),
        provider.token_endpoint(),
        provider.logout_endpoint()
    ))
}

fn redacted(secret: Option<&str>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "[set]",
        _ => "[not set]",
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    const CONFIG: &str = r#"
[server]
port = 9000
gateway_secret = "gw-very-secret"

[provider]
server_url = "https://sso.example.com/"
realm = "acme"
client_id = "acme-web"
client_secret = "kc-very-secret"

[policy]
allowed_redirect_prefix = "https://app.example.com"
allowed_idp_hints = ["kakao", "google"]
"#;

    fn write_config() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        file
    }

    #[test]
    fn summary_redacts_secrets() {
        let file = write_config();
        let config = load(Some(file.path())).unwrap();
        let text = summary(&config);

        assert!(!text.contains("gw-very-secret"));
        assert!(!text.contains("kc-very-secret"));
        assert!(text.contains("gateway secret:   [set]"));
        assert!(text.contains("client secret:    [set]"));
        assert!(text.contains("idp hints:        google, kakao"));
        assert!(text.contains("redirect prefix:  https://app.example.com\n"));
        assert!(text.contains("127.0.0.1:9000"));
    }

    #[test]
    fn endpoints_follow_realm_layout() {
        let file = write_config();
        let config = load(Some(file.path())).unwrap();
        let text = endpoints(&config).unwrap();

        assert!(text.contains(
            "authorize: https://sso.example.com/realms/acme/protocol/openid-connect/auth"
        ));
        assert!(text.contains(
            "token:     https://sso.example.com/realms/acme/protocol/openid-connect/token"
        ));
        assert!(text.contains(
            "logout:    https://sso.example.com/realms/acme/protocol/openid-connect/logout"
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/tokenproxy.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
