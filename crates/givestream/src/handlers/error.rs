//! api error handling and response envelopes.
//!
//! every response is enveloped: `{"success": true, "data": ...}` on
//! success, `{"success": false, "error": ...}` on failure, with an
//! extra `details` array when validation fails field by field.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

/// a single field validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// wire name of the offending input field.
    pub field: &'static str,
    /// what was wrong with it.
    pub message: String,
}

impl FieldError {
    /// create a field error.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// error type for api handler responses.
#[derive(Debug)]
pub enum ApiError {
    /// malformed input (400).
    BadRequest(String),

    /// per-field validation failures (400 with a `details` array).
    Validation(Vec<FieldError>),

    /// missing or invalid credentials (401).
    Unauthorized(String),

    /// authenticated but not allowed (403).
    Forbidden(String),

    /// no such resource (404).
    NotFound(String),

    /// unanticipated fault (500); the detail is logged, never echoed.
    Internal(String),
}

impl ApiError {
    /// build a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// build an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// build an internal error from any displayable fault.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                Some(details),
            ),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message, None),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error in request handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match details {
            Some(details) => json!({"success": false, "error": error, "details": details}),
            None => json!({"success": false, "error": error}),
        };

        (status, Json(body)).into_response()
    }
}

/// wrap a payload in the success envelope.
pub fn success(data: impl Serialize) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

/// extension trait mapping arbitrary errors into 500s.
pub trait ResultExt<T> {
    /// map the error into [`ApiError::Internal`].
    fn map_internal(self) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn map_internal(self) -> Result<T, ApiError> {
        self.map_err(ApiError::internal)
    }
}

/// extension trait turning absent options into api errors.
pub trait OptionExt<T> {
    /// 404 with "`what` not found" when the option is empty.
    fn or_not_found(self, what: &str) -> Result<T, ApiError>;

    /// 401 with the given message when the option is empty.
    fn or_unauthorized(self, message: &str) -> Result<T, ApiError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, what: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::NotFound(format!("{what} not found")))
    }

    fn or_unauthorized(self, message: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::Unauthorized(message.to_string()))
    }
}

/// json body extractor whose rejections use the error envelope.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// query string extractor whose rejections use the error envelope.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
