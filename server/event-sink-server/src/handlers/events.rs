//! Event submission handlers.
//!
//! `POST /events/key/v1/:id` and `POST /events/jwt/v1/:id` accept the same
//! payload and differ only in the authentication scheme bound to them.
//! Credentials are checked first; the body is only parsed and validated for
//! authorized requests.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    Json,
};
use serde_json::Value;
use tracing::{debug, info, instrument, Span};

use crate::auth::AuthVariant;
use crate::error::{ApiResult, MessageResponse};
use crate::server::EventSinkServer;
use crate::validation::validate_event_schema;

/// Path parameter and body as extracted by axum. Rejections are kept so they
/// surface only after authentication, as `{message}` errors.
type EventPath = Result<Path<String>, PathRejection>;
type EventBody = Result<Bytes, BytesRejection>;

/// POST /events/key/v1/:id
pub async fn post_event_with_api_key(
    State(server): State<EventSinkServer>,
    path: EventPath,
    headers: HeaderMap,
    body: EventBody,
) -> ApiResult<Json<MessageResponse>> {
    post_event(&server, AuthVariant::ApiKey, path, &headers, body)
}

/// POST /events/jwt/v1/:id
pub async fn post_event_with_jwt(
    State(server): State<EventSinkServer>,
    path: EventPath,
    headers: HeaderMap,
    body: EventBody,
) -> ApiResult<Json<MessageResponse>> {
    post_event(&server, AuthVariant::BearerChallenge, path, &headers, body)
}

/// Authenticates, validates and acknowledges one event.
///
/// # Errors
///
/// - 401 when the credentials for `variant` are missing or wrong
/// - 400 when the id or body cannot be read, the body is not JSON, or it
///   fails validation
#[instrument(
    name = "post_event",
    skip_all,
    fields(auth = %variant, event_id = tracing::field::Empty)
)]
pub fn post_event(
    server: &EventSinkServer,
    variant: AuthVariant,
    path: EventPath,
    headers: &HeaderMap,
    body: EventBody,
) -> ApiResult<Json<MessageResponse>> {
    variant.authorize(headers, server.clock.as_ref())?;

    let Path(event_id) = path?;
    Span::current().record("event_id", event_id.as_str());

    let body = body?;
    let payload = parse_payload(&body)?;
    debug!(content_length = body.len(), payload = %payload, "Received event payload");

    let event = validate_event_schema(&event_id, &payload)?;

    info!(
        event_name = %event.event_name,
        event_category = %event.event_category,
        "Event accepted"
    );

    Ok(Json(MessageResponse::ok()))
}

/// An empty body is treated as an absent payload and rejected by validation.
fn parse_payload(body: &Bytes) -> ApiResult<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}
