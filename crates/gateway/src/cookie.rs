//! The refresh-token cookie.
//!
//! Every cookie written here is `HttpOnly; Secure; SameSite=Strict`. The
//! access token never goes into a cookie.

use {
    axum_extra::extract::cookie::{Cookie, CookieJar, SameSite},
    tokenproxy_config::RefreshCookieConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookieSpec {
    pub cookie_name: String,
    pub max_age_seconds: i64,
    pub path: String,
    /// Written as `Domain=` only when set; otherwise the cookie is host-only.
    pub domain: Option<String>,
}

impl RefreshCookieSpec {
    pub fn from_config(config: &RefreshCookieConfig) -> Self {
        Self {
            cookie_name: config.name.clone(),
            max_age_seconds: config.max_age_secs,
            path: config.path.clone(),
            domain: config.domain.clone(),
        }
    }
}

/// Cookie carrying a freshly issued refresh token.
pub fn issue(refresh_token: &str, spec: &RefreshCookieSpec) -> Cookie<'static> {
    build(refresh_token.to_string(), spec.max_age_seconds, spec)
}

/// Same attributes, empty value, `Max-Age=0`.
pub fn clear(spec: &RefreshCookieSpec) -> Cookie<'static> {
    build(String::new(), 0, spec)
}

/// Refresh token sent by the browser, if any. An empty value counts as absent.
pub fn read(jar: &CookieJar, spec: &RefreshCookieSpec) -> Option<String> {
    jar.get(&spec.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn build(value: String, max_age_seconds: i64, spec: &RefreshCookieSpec) -> Cookie<'static> {
    let mut builder = Cookie::build((spec.cookie_name.clone(), value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path(spec.path.clone())
        .max_age(time::Duration::seconds(max_age_seconds));
    if let Some(domain) = &spec.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::http::{HeaderMap, HeaderValue, header},
    };

    fn spec() -> RefreshCookieSpec {
        RefreshCookieSpec {
            cookie_name: "RT".into(),
            max_age_seconds: 1_209_600,
            path: "/api".into(),
            domain: None,
        }
    }

    fn attributes(cookie: &Cookie<'_>) -> Vec<String> {
        cookie
            .to_string()
            .split("; ")
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn issue_sets_all_security_attributes() {
        let cookie = issue("rt-value", &spec());
        let attrs = attributes(&cookie);
        assert_eq!(attrs[0], "RT=rt-value");
        for expected in ["HttpOnly", "Secure", "SameSite=Strict", "Path=/api", "Max-Age=1209600"] {
            assert!(attrs.iter().any(|a| a == expected), "missing {expected}: {attrs:?}");
        }
        assert!(!attrs.iter().any(|a| a.starts_with("Domain=")));
    }

    #[test]
    fn clear_keeps_attributes_with_zero_max_age() {
        let cookie = clear(&spec());
        let attrs = attributes(&cookie);
        assert_eq!(attrs[0], "RT=");
        for expected in ["HttpOnly", "Secure", "SameSite=Strict", "Path=/api", "Max-Age=0"] {
            assert!(attrs.iter().any(|a| a == expected), "missing {expected}: {attrs:?}");
        }
    }

    #[test]
    fn domain_is_written_when_configured() {
        let mut spec = spec();
        spec.domain = Some("example.com".into());
        let attrs = attributes(&issue("v", &spec));
        assert!(attrs.iter().any(|a| a == "Domain=example.com"), "{attrs:?}");
    }

    #[test]
    fn read_ignores_missing_and_empty_cookies() {
        let mut headers = HeaderMap::new();
        assert_eq!(read(&CookieJar::from_headers(&headers), &spec()), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("RT=; other=1"));
        assert_eq!(read(&CookieJar::from_headers(&headers), &spec()), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("other=1; RT=abc"));
        assert_eq!(
            read(&CookieJar::from_headers(&headers), &spec()).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn from_config_maps_fields() {
        let config = RefreshCookieConfig {
            name: "N".into(),
            max_age_secs: 60,
            path: "/".into(),
            domain: Some("d.example".into()),
        };
        assert_eq!(
            RefreshCookieSpec::from_config(&config),
            RefreshCookieSpec {
                cookie_name: "N".into(),
                max_age_seconds: 60,
                path: "/".into(),
                domain: Some("d.example".into()),
            }
        );
    }
}
