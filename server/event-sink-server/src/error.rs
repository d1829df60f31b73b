use axum::{
    extract::rejection::{BytesRejection, PathRejection},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Message returned to callers for any failure that is not a typed API error.
/// The underlying cause is only ever logged.
pub const GENERIC_ERROR_MESSAGE: &str = "An error has occurred, check the logs for details.";

/// Header used to expose the refreshed bearer token to browser clients
pub const EXPOSE_HEADERS: HeaderName = HeaderName::from_static("access-control-expose-headers");

/// Standard response body. Every response other than a CORS preflight is a
/// single `message` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The acknowledgement sent for an accepted event
    pub fn ok() -> Self {
        Self::new("ok")
    }
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Missing or rejected credentials. When `challenge` is set, it is handed
    /// back to the caller in the `Authorization` header so it can retry.
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        challenge: Option<String>,
    },

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an authentication error without a retry token
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            challenge: None,
        }
    }

    /// Create an authentication error carrying the token the caller should replay
    pub fn challenge(message: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            challenge: Some(token.into()),
        }
    }

    /// Create an internal error. The message is logged, never returned.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::MethodNotAllowed => "method_not_allowed",
            ApiError::Timeout { .. } => "timeout",
            ApiError::NotFound => "not_found",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    /// The message written to the response body
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation { message }
            | ApiError::BadRequest { message }
            | ApiError::Authentication { message, .. } => message.clone(),
            ApiError::MethodNotAllowed => "Method Not Allowed".to_string(),
            ApiError::Timeout { .. } => "Request timed out.".to_string(),
            ApiError::NotFound => "Not found".to_string(),
            ApiError::Internal { .. } => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let body = MessageResponse::new(self.public_message());
        let mut response = (status_code, Json(body)).into_response();

        if let ApiError::Authentication {
            challenge: Some(token),
            ..
        } = &self
        {
            match HeaderValue::from_str(token) {
                Ok(value) => {
                    let headers = response.headers_mut();
                    headers.insert(header::AUTHORIZATION, value);
                    headers.insert(EXPOSE_HEADERS, HeaderValue::from_static("Authorization"));
                }
                Err(e) => {
                    error!(error_id = %error_id, error = %e, "Challenge token is not a valid header value");
                }
            }
        }

        response
    }
}

/// Convert serde JSON errors to API errors
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", error))
    }
}

/// Undecodable path parameters, e.g. an id that is not valid UTF-8
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Unreadable or oversized request bodies
impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
