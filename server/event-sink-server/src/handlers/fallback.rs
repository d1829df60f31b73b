use crate::error::ApiError;

/// Any method other than POST on an event path. Runs no authentication and
/// no validation.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Any path that does not match a known route
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
