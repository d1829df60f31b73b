//! Rotating bearer token challenge.
//!
//! Stands in for real token issuance: the only valid token on a given day is
//! [`TOKEN_PREFIX`] followed by the date as `YYYY-MM-DD`. A caller that
//! presents anything else is told the current token in the 401 response.

use axum::http::{header, HeaderMap};
use chrono::NaiveDate;

use super::AuthOutcome;

pub const TOKEN_PREFIX: &str = "FAKE_JWT_TOKEN_";

/// The token accepted on `date`
pub fn expected_token(date: NaiveDate) -> String {
    format!("{TOKEN_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// Exact comparison against today's token. Empty, missing and wrong headers
/// are all answered with the current token.
pub fn verify(headers: &HeaderMap, today: NaiveDate) -> AuthOutcome {
    let expected = expected_token(today);

    let presented = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    if !presented.is_empty() && presented == expected.as_bytes() {
        AuthOutcome::Authorized
    } else {
        AuthOutcome::Unauthorized {
            challenge: Some(expected),
        }
    }
}
