pub mod error;
pub mod pkce;
pub mod policy;
pub mod provider;
pub mod service;
pub mod types;

pub use error::TokenError;
pub use policy::{Policy, validate_idp_hint, validate_redirect};
pub use provider::{IdentityProvider, keycloak::KeycloakProvider};
pub use service::TokenProxy;
pub use types::{ExchangeRequest, PkceChallenge, RedirectRequest, TokenPair};
