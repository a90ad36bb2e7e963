use {
    serde::{Deserialize, Serialize},
    tokenproxy_oauth::{ExchangeRequest, RedirectRequest, TokenPair},
};

use crate::error::ApiError;

// ============================================================================
// Requests
// ============================================================================

/// Body of `POST /api/v1/token/idp-login`. Missing fields deserialize as
/// empty strings so they are reported by field name.
#[derive(Debug, Deserialize)]
pub struct IdpLoginBody {
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub code_challenge: String,
    #[serde(default)]
    pub idp_hint: String,
}

impl IdpLoginBody {
    pub fn into_request(self) -> Result<RedirectRequest, ApiError> {
        require_absolute_url("redirect_uri", &self.redirect_uri)?;
        require_non_blank("code_challenge", &self.code_challenge)?;
        require_non_blank("idp_hint", &self.idp_hint)?;
        Ok(RedirectRequest {
            redirect_uri: self.redirect_uri,
            code_challenge: self.code_challenge,
            idp_hint: self.idp_hint,
        })
    }
}

/// Body of `POST /api/v1/token/exchange`. `token` is the authorization code.
#[derive(Deserialize)]
pub struct ExchangeBody {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub verifier: String,
    #[serde(default)]
    pub redirect_uri: String,
}

impl ExchangeBody {
    pub fn into_request(self) -> Result<ExchangeRequest, ApiError> {
        require_non_blank("token", &self.token)?;
        require_non_blank("verifier", &self.verifier)?;
        require_absolute_url("redirect_uri", &self.redirect_uri)?;
        Ok(ExchangeRequest {
            authorization_code: self.token,
            pkce_verifier: self.verifier,
            redirect_uri: self.redirect_uri,
        })
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct IdpLoginResponse {
    pub url: String,
}

/// Only the access token leaves in a body; the refresh token goes in the cookie.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

impl From<&TokenPair> for TokenResponse {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            expires_in: pair.access_token_expires_in,
        }
    }
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(field, format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_absolute_url(field: &'static str, value: &str) -> Result<(), ApiError> {
    require_non_blank(field, value)?;
    match url::Url::parse(value) {
        Ok(url) if url.has_host() => Ok(()),
        _ => Err(ApiError::invalid(field, format!("{field} must be a valid URL"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(err: ApiError) -> &'static str {
        match err {
            ApiError::InvalidRequest { field, .. } => field,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn idp_login_body_converts() {
        let body: IdpLoginBody = serde_json::from_value(serde_json::json!({
            "redirect_uri": "https://app.example.com/cb",
            "code_challenge": "abc",
            "idp_hint": "google",
        }))
        .unwrap();
        let req = body.into_request().unwrap();
        assert_eq!(req.redirect_uri, "https://app.example.com/cb");
        assert_eq!(req.code_challenge, "abc");
        assert_eq!(req.idp_hint, "google");
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let body: IdpLoginBody = serde_json::from_value(serde_json::json!({
            "redirect_uri": "https://app.example.com/cb",
            "idp_hint": "google",
        }))
        .unwrap();
        assert_eq!(invalid_field(body.into_request().unwrap_err()), "code_challenge");
    }

    #[test]
    fn redirect_must_be_absolute_url() {
        for bad in ["not a url", "/relative/cb", "mailto:someone@example.com", "   "] {
            let body = ExchangeBody {
                token: "code".into(),
                verifier: "v".into(),
                redirect_uri: bad.into(),
            };
            assert_eq!(invalid_field(body.into_request().unwrap_err()), "redirect_uri", "{bad}");
        }
    }

    #[test]
    fn exchange_body_maps_token_to_authorization_code() {
        let body = ExchangeBody {
            token: "code-1".into(),
            verifier: "ver-1".into(),
            redirect_uri: "https://app.example.com/cb".into(),
        };
        let req = body.into_request().unwrap();
        assert_eq!(req.authorization_code, "code-1");
        assert_eq!(req.pkce_verifier, "ver-1");
    }

    #[test]
    fn token_response_omits_refresh_token() {
        let pair = TokenPair {
            access_token: "at".into(),
            access_token_expires_in: 300,
            refresh_token: "rt-secret".into(),
            refresh_token_expires_in: 1800,
        };
        let json = serde_json::to_string(&TokenResponse::from(&pair)).unwrap();
        assert_eq!(json, r#"{"access_token":"at","expires_in":300}"#);
    }
}
