//! login, refresh and logout handlers.

use axum::Json;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use givestream_db::Store;
use givestream_types::{Admin, NewSecurityLog, SecurityEventKind};

use crate::AppState;
use crate::handlers::admin_auth::AdminContext;
use crate::handlers::error::{ApiError, ApiJson, ResultExt, success};
use crate::password;
use crate::rate_limit::ClientIp;
use crate::tokens::{build_refresh_cookie, clear_refresh_cookie, refresh_token_from_cookies};

/// the one message every failed login gets.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

/// POST /api/auth/login - issue an access token and a refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let admin = state
        .db
        .admin_by_email(&payload.email)
        .await
        .map_internal()?;

    let admin = match admin {
        Some(admin) if password::verify(&payload.password, &admin.password_hash) => admin,
        // unknown email and wrong password answer identically
        _ => {
            state.security_log.record(
                NewSecurityLog::new(SecurityEventKind::Login, ip.to_string())
                    .detail(json!({"success": false})),
            );
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let access_token = state.token_keys.mint_access(&admin).map_internal()?;
    let refresh_token = state.token_keys.mint_refresh(&admin).map_internal()?;

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::Login, ip.to_string())
            .actor(admin.email.clone())
            .detail(json!({"success": true})),
    );

    respond_with_cookie(
        success(TokenResponse { access_token }),
        build_refresh_cookie(
            &refresh_token,
            state.token_keys.refresh_ttl_secs(),
            state.config.auth.secure_cookies,
        ),
    )
}

/// POST /api/auth/refresh - mint a fresh access token from the cookie.
///
/// the refresh token itself is not rotated; the cookie set at login
/// stays valid for its full lifetime.
pub async fn refresh(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let reject = |detail: &str| {
        state.security_log.record(
            NewSecurityLog::new(SecurityEventKind::TokenInvalid, ip.to_string())
                .detail(json!({"context": "refresh", "reason": detail})),
        );
        ApiError::unauthorized("invalid refresh token")
    };

    let token = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(refresh_token_from_cookies)
        .ok_or_else(|| reject("missing cookie"))?;

    let admin_id = state
        .token_keys
        .verify_refresh(token)
        .map_err(|_| reject("verification failed"))?;

    // the account has to still exist for the refresh to go through
    let admin: Admin = match state.db.admin_by_id(admin_id).await.map_internal()? {
        Some(admin) => admin,
        None => return Err(reject("account gone")),
    };

    let access_token = state.token_keys.mint_access(&admin).map_internal()?;

    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::TokenRefresh, ip.to_string())
            .actor(admin.email.clone()),
    );

    Ok(success(TokenResponse { access_token }))
}

/// POST /api/auth/logout - clear the refresh cookie.
///
/// stateless tokens cannot be revoked, so the access token presented
/// here stays valid until it expires on its own.
pub async fn logout(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    admin: AdminContext,
) -> Result<Response, ApiError> {
    state.security_log.record(
        NewSecurityLog::new(SecurityEventKind::Logout, ip.to_string())
            .actor(admin.admin.email.clone()),
    );

    respond_with_cookie(
        success(Value::Null),
        clear_refresh_cookie(state.config.auth.secure_cookies),
    )
}

fn respond_with_cookie(body: Json<Value>, cookie: String) -> Result<Response, ApiError> {
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, HeaderValue::from_str(&cookie).map_internal()?);
    Ok(response)
}
