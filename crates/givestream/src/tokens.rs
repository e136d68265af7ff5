//! jwt minting and verification for admin sessions.
//!
//! two hs256 token families with distinct secrets:
//! - access tokens: short-lived, presented as `Authorization: Bearer`
//!   on admin routes and socket handshakes.
//! - refresh tokens: longer-lived, held in an http-only cookie scoped
//!   to the auth routes; presenting one mints a fresh access token.
//!
//! tokens are stateless. a refresh does not rotate the cookie, and
//! logout clears the cookie without revoking anything server-side, so
//! an already-issued access token stays valid until natural expiry.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use givestream_types::{Admin, AdminId, AuthConfig};

/// name of the refresh token cookie.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// cookie path; the refresh token is only ever sent to the auth routes.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// claims carried by both token families.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// admin id, stringified.
    pub sub: String,
    /// admin login email at issue time.
    pub email: String,
    /// admin role at issue time.
    pub role: String,
    /// expiry as unix seconds.
    pub exp: usize,
    /// token family, `access` or `refresh`.
    pub kind: String,
}

/// error from token minting or verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// signing failed.
    #[error("failed to sign token")]
    Signing,

    /// the token is malformed, has a bad signature, or expired.
    #[error("token is invalid or expired")]
    Invalid,

    /// the token belongs to the other family.
    #[error("wrong token kind")]
    WrongKind,

    /// the subject claim is not an admin id.
    #[error("token subject is not an admin id")]
    BadSubject,
}

/// signing and verification keys derived from config, built once at startup.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenKeys {
    /// derive keys from the auth config.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        }
    }

    /// mint an access token for an admin.
    pub fn mint_access(&self, admin: &Admin) -> Result<String, TokenError> {
        mint(&self.access_encoding, admin, "access", self.access_ttl_secs)
    }

    /// mint a refresh token for an admin.
    pub fn mint_refresh(&self, admin: &Admin) -> Result<String, TokenError> {
        mint(&self.refresh_encoding, admin, "refresh", self.refresh_ttl_secs)
    }

    /// verify an access token and return the admin id it names.
    pub fn verify_access(&self, token: &str) -> Result<AdminId, TokenError> {
        verify(&self.access_decoding, token, "access")
    }

    /// verify a refresh token and return the admin id it names.
    pub fn verify_refresh(&self, token: &str) -> Result<AdminId, TokenError> {
        verify(&self.refresh_decoding, token, "refresh")
    }

    /// refresh token lifetime in seconds, for the cookie's Max-Age.
    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }
}

fn mint(key: &EncodingKey, admin: &Admin, kind: &str, ttl_secs: u64) -> Result<String, TokenError> {
    let claims = Claims {
        sub: admin.id.0.to_string(),
        email: admin.email.clone(),
        role: admin.role.as_str().to_string(),
        exp: (Utc::now().timestamp() + ttl_secs as i64) as usize,
        kind: kind.to_string(),
    };
    encode(&Header::default(), &claims, key).map_err(|_| TokenError::Signing)
}

fn verify(key: &DecodingKey, token: &str, kind: &str) -> Result<AdminId, TokenError> {
    let data = decode::<Claims>(token, key, &Validation::default())
        .map_err(|_| TokenError::Invalid)?;

    if data.claims.kind != kind {
        return Err(TokenError::WrongKind);
    }

    let id: u64 = data.claims.sub.parse().map_err(|_| TokenError::BadSubject)?;
    Ok(AdminId(id))
}

/// build the Set-Cookie value carrying a refresh token.
pub fn build_refresh_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}={token}; HttpOnly; SameSite=Strict; Path={REFRESH_COOKIE_PATH}; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// build the Set-Cookie value that clears the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}=; HttpOnly; SameSite=Strict; Path={REFRESH_COOKIE_PATH}; Max-Age=0"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// pull the refresh token out of a Cookie header value.
pub fn refresh_token_from_cookies(cookie_header: &str) -> Option<&str> {
    for cookie in cookie_header.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            if name == REFRESH_COOKIE_NAME {
                return Some(value);
            }
        }
    }
    None
}
