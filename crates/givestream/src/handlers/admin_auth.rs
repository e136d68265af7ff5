//! bearer token authentication for admin routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use givestream_db::Store;
use givestream_types::{Admin, NewSecurityLog, Role, SecurityEventKind};

use crate::AppState;
use crate::handlers::error::ApiError;

/// context for an authenticated admin request.
///
/// extracted from the `Authorization: Bearer <token>` header. the
/// account is re-fetched on every request, so a deleted admin loses
/// access immediately rather than when their token expires.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// the authenticated account.
    pub admin: Admin,
}

/// why admin authentication failed.
#[derive(Debug)]
pub enum AdminAuthError {
    /// no Authorization header was sent.
    MissingHeader,
    /// the Authorization header is not a bearer token.
    InvalidHeader,
    /// the token is malformed, forged or expired.
    InvalidToken,
    /// the token names an account that no longer exists.
    UnknownAccount,
    /// the account exists but is not an admin.
    WrongRole,
    /// the account lookup itself failed.
    Internal(String),
}

impl AdminAuthError {
    fn message(&self) -> &'static str {
        match self {
            AdminAuthError::MissingHeader => "authentication required",
            AdminAuthError::InvalidHeader => "invalid authorization header",
            // deleted accounts and bad tokens read the same from outside
            AdminAuthError::InvalidToken | AdminAuthError::UnknownAccount => "invalid token",
            AdminAuthError::WrongRole => "admin access required",
            AdminAuthError::Internal(_) => "internal server error",
        }
    }
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        match self {
            AdminAuthError::Internal(detail) => ApiError::Internal(detail).into_response(),
            AdminAuthError::WrongRole => {
                ApiError::Forbidden(self.message().to_string()).into_response()
            }
            other => ApiError::Unauthorized(other.message().to_string()).into_response(),
        }
    }
}

/// extract the token from an `Authorization: Bearer <token>` value.
pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let origin = state
            .key_extractor
            .client_ip_from_parts(parts)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let path = parts.uri.path().to_string();

        let reject = |error: AdminAuthError| {
            let kind = match error {
                AdminAuthError::InvalidToken | AdminAuthError::UnknownAccount => {
                    SecurityEventKind::TokenInvalid
                }
                _ => SecurityEventKind::Unauthorized,
            };
            state.security_log.record(
                NewSecurityLog::new(kind, origin.clone()).detail(json!({"path": path})),
            );
            error
        };

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| reject(AdminAuthError::MissingHeader))?;
        let token = header
            .to_str()
            .ok()
            .and_then(parse_bearer_token)
            .ok_or_else(|| reject(AdminAuthError::InvalidHeader))?;

        let admin_id = state
            .token_keys
            .verify_access(token)
            .map_err(|_| reject(AdminAuthError::InvalidToken))?;

        let admin = state
            .db
            .admin_by_id(admin_id)
            .await
            .map_err(|e| AdminAuthError::Internal(e.to_string()))?
            .ok_or_else(|| reject(AdminAuthError::UnknownAccount))?;

        if admin.role != Role::Admin {
            return Err(reject(AdminAuthError::WrongRole));
        }

        Ok(AdminContext { admin })
    }
}
