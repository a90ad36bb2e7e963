//! Configuration loading for the token proxy.
//!
//! Config is read once at startup from a TOML or YAML file, overlaid with
//! `TOKENPROXY_*` environment variables and validated before anything else
//! is constructed.

pub mod loader;
pub mod schema;

pub use {
    loader::{discover_config_file, load_config, load_config_with_env},
    schema::{
        PolicyConfig, ProviderConfig, RefreshCookieConfig, RevokeTimeoutPolicy, ServerConfig,
        TokenProxyConfig,
    },
};
