//! Allow-list checks for redirect targets and idp hints.
//!
//! Both checks are pure and must pass before anything is sent upstream.

use std::collections::BTreeSet;

use tokenproxy_config::PolicyConfig;

use crate::error::TokenError;

/// Redirect and idp-hint allow-list, fixed at startup.
#[derive(Debug, Clone)]
pub struct Policy {
    allowed_redirect_prefix: String,
    allowed_idp_hints: BTreeSet<String>,
}

impl Policy {
    pub fn new<I, S>(allowed_redirect_prefix: impl Into<String>, allowed_idp_hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_redirect_prefix: allowed_redirect_prefix.into(),
            allowed_idp_hints: allowed_idp_hints.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            config.allowed_redirect_prefix.clone(),
            config.allowed_idp_hints.iter().cloned(),
        )
    }

    pub fn allowed_redirect_prefix(&self) -> &str {
        &self.allowed_redirect_prefix
    }

    pub fn allowed_idp_hints(&self) -> &BTreeSet<String> {
        &self.allowed_idp_hints
    }
}

/// Exact, case-sensitive prefix match. No normalization of scheme or
/// trailing slashes.
pub fn validate_redirect(uri: &str, policy: &Policy) -> Result<(), TokenError> {
    if uri.starts_with(&policy.allowed_redirect_prefix) {
        return Ok(());
    }
    Err(TokenError::not_allowed(
        "redirect_uri",
        format!(
            "The redirect_uri is not allowed. Allowed redirect_uri must start with {}",
            policy.allowed_redirect_prefix
        ),
    ))
}

/// Exact membership in the configured hint set.
pub fn validate_idp_hint(hint: &str, policy: &Policy) -> Result<(), TokenError> {
    if policy.allowed_idp_hints.contains(hint) {
        return Ok(());
    }
    let allowed: Vec<&str> = policy.allowed_idp_hints.iter().map(String::as_str).collect();
    Err(TokenError::not_allowed(
        "idp_hint",
        format!(
            "The idp_hint is not allowed. Allowed idp_hints are [{}]",
            allowed.join(", ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn policy() -> Policy {
        Policy::new("https://app.example.com", ["google", "kakao"])
    }

    #[rstest]
    #[case("https://app.example.com")]
    #[case("https://app.example.com/cb")]
    #[case("https://app.example.com/cb?next=/home")]
    // Prefix match only: a longer host passes, as documented.
    #[case("https://app.example.com.evil.net/cb")]
    fn redirect_allowed(#[case] uri: &str) {
        assert!(validate_redirect(uri, &policy()).is_ok());
    }

    #[rstest]
    #[case("https://evil.com/cb")]
    #[case("http://app.example.com/cb")]
    #[case("HTTPS://APP.EXAMPLE.COM/cb")]
    #[case("https://app.example.co")]
    #[case("")]
    fn redirect_rejected(#[case] uri: &str) {
        match validate_redirect(uri, &policy()) {
            Err(TokenError::NotAllowed { field, reason }) => {
                assert_eq!(field, "redirect_uri");
                assert!(reason.contains("https://app.example.com"), "{reason}");
            },
            other => panic!("expected NotAllowed, got {other:?}"),
        }
    }

    #[rstest]
    #[case("google")]
    #[case("kakao")]
    fn idp_hint_allowed(#[case] hint: &str) {
        assert!(validate_idp_hint(hint, &policy()).is_ok());
    }

    #[rstest]
    #[case("Google")]
    #[case("github")]
    #[case("google ")]
    #[case("")]
    fn idp_hint_rejected(#[case] hint: &str) {
        match validate_idp_hint(hint, &policy()) {
            Err(TokenError::NotAllowed { field, reason }) => {
                assert_eq!(field, "idp_hint");
                assert!(reason.contains("google, kakao"), "{reason}");
            },
            other => panic!("expected NotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn from_config_copies_values() {
        let cfg = PolicyConfig {
            allowed_redirect_prefix: "https://a.example".into(),
            allowed_idp_hints: vec!["naver".into()],
        };
        let policy = Policy::from_config(&cfg);
        assert_eq!(policy.allowed_redirect_prefix(), "https://a.example");
        assert!(policy.allowed_idp_hints().contains("naver"));
    }
}
