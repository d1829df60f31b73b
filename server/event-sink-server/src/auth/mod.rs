//! Authentication negotiation for the event routes
//!
//! Each event route is bound to exactly one [`AuthVariant`] when the router
//! is built. The variant never depends on the request body. Both variants
//! share the same `verify` contract so the handler does not care which one
//! is active:
//!
//! - [`AuthVariant::ApiKey`] only requires a non-empty `X-Api-Key` header
//! - [`AuthVariant::BearerChallenge`] requires the `Authorization` header to
//!   equal a token derived from today's date, and hands the current token
//!   back on failure so the caller can retry immediately

pub mod api_key;
pub mod bearer;

use axum::http::HeaderMap;

use crate::clock::Clock;
use crate::error::{ApiError, ApiResult};

pub use api_key::X_API_KEY;
pub use bearer::{expected_token, TOKEN_PREFIX};

/// Authentication scheme bound to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthVariant {
    ApiKey,
    BearerChallenge,
}

/// Result of checking a request's credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    /// `challenge` is the token the caller must present on its next attempt
    Unauthorized { challenge: Option<String> },
}

impl AuthVariant {
    /// Name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthVariant::ApiKey => "api_key",
            AuthVariant::BearerChallenge => "jwt",
        }
    }

    /// Checks the request headers against this scheme
    pub fn verify(&self, headers: &HeaderMap, clock: &dyn Clock) -> AuthOutcome {
        match self {
            AuthVariant::ApiKey => api_key::verify(headers),
            AuthVariant::BearerChallenge => bearer::verify(headers, clock.today()),
        }
    }

    /// Like [`AuthVariant::verify`], but maps a rejection to the error the
    /// caller receives.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] when the credentials are missing
    /// or wrong. For the bearer scheme the error carries the current token.
    pub fn authorize(&self, headers: &HeaderMap, clock: &dyn Clock) -> ApiResult<()> {
        match (self, self.verify(headers, clock)) {
            (_, AuthOutcome::Authorized) => Ok(()),
            (AuthVariant::ApiKey, AuthOutcome::Unauthorized { .. }) => Err(ApiError::authentication(
                format!("{X_API_KEY} is missing from the request."),
            )),
            (AuthVariant::BearerChallenge, AuthOutcome::Unauthorized { challenge: Some(token) }) => {
                Err(ApiError::challenge("Unauthorized", token))
            }
            (AuthVariant::BearerChallenge, AuthOutcome::Unauthorized { challenge: None }) => {
                Err(ApiError::authentication("Unauthorized"))
            }
        }
    }
}

impl std::fmt::Display for AuthVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
