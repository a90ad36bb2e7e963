use std::sync::Arc;

use {
    axum::{
        Json,
        extract::{State, rejection::JsonRejection},
        http::StatusCode,
    },
    axum_extra::extract::cookie::CookieJar,
    tokenproxy_oauth::TokenError,
    tracing::info,
};

use crate::{
    cookie,
    dto::{ExchangeBody, IdpLoginBody, IdpLoginResponse, TokenResponse},
    error::ApiError,
    state::AppState,
};

pub async fn health() -> &'static str {
    "ok"
}

/// `POST /api/v1/token/idp-login`
pub async fn idp_login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<IdpLoginBody>, JsonRejection>,
) -> Result<Json<IdpLoginResponse>, ApiError> {
    let request = json_body(body)?.into_request()?;
    let url = state.proxy.generate_authorization_uri(&request)?;
    Ok(Json(IdpLoginResponse { url }))
}

/// `POST /api/v1/token/exchange`
pub async fn exchange(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Result<Json<ExchangeBody>, JsonRejection>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let request = json_body(body)?.into_request()?;
    let tokens = state.proxy.exchange(&request).await?;
    info!("authorization code exchanged");

    let jar = jar.add(cookie::issue(&tokens.refresh_token, &state.refresh_cookie));
    Ok((jar, Json(TokenResponse::from(&tokens))))
}

/// `POST /api/v1/token/refresh`
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let refresh_token = refresh_cookie(&jar, &state)?;
    let tokens = state.proxy.refresh(&refresh_token).await?;
    info!("session refreshed");

    let jar = jar.add(cookie::issue(&tokens.refresh_token, &state.refresh_cookie));
    Ok((jar, Json(TokenResponse::from(&tokens))))
}

/// `POST /api/v1/token/logout`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let refresh_token = refresh_cookie(&jar, &state)?;
    state.proxy.revoke(&refresh_token).await?;
    info!("session revoked");

    let jar = jar.add(cookie::clear(&state.refresh_cookie));
    Ok((jar, StatusCode::NO_CONTENT))
}

fn refresh_cookie(jar: &CookieJar, state: &AppState) -> Result<String, ApiError> {
    cookie::read(jar, &state.refresh_cookie)
        .ok_or(ApiError::Token(TokenError::MissingCredential))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::invalid("body", rejection.body_text()))
}
