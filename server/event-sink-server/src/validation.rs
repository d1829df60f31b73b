//! Event payload validation
//!
//! Turns an untyped JSON body into an [`EnrichedAnalyticsEvent`]. Every
//! check is a gate: the first failure is returned and nothing after it runs.
//!
//! 1. the body must be a non-empty JSON object
//! 2. every field in [`REQUIRED_FIELDS`] must be a non-empty string
//! 3. `eventCategory` must be a known category
//! 4. `anonymousUser` must be `"0"` or `"1"`
//! 5. `schemaVersion` must be [`SUPPORTED_SCHEMA_VERSION`]
//! 6. `timestamp` must be strict ISO 8601
//! 7. the payload `eventId` must match the id in the request path
//!
//! Fields that are not checked above are copied without inspection.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::types::{EnrichedAnalyticsEvent, EventCategory, REQUIRED_FIELDS, SUPPORTED_SCHEMA_VERSION};

lazy_static! {
    // YYYY-MM-DDTHH:MM:SS, up to millisecond precision, then Z or a +/-HH:MM offset
    static ref ISO_8601_REGEX: Regex = Regex::new(
        r"^([0-9]{4})-(0[1-9]|1[0-2])-(0[1-9]|[1-2][0-9]|3[0-1])T([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9])(\.[0-9]{1,3})?(Z|[+-]([01][0-9]|2[0-3]):([0-5][0-9]))$"
    ).unwrap();
}

/// Returns a validation error unless the predicate holds
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(matches!(anonymous_user, "0" | "1"), "Anonymous user needs to be either 0 or 1.");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Parses and validates an event payload received for `event_id`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] describing the first check that failed.
pub fn validate_event_schema(event_id: &str, payload: &Value) -> ApiResult<EnrichedAnalyticsEvent> {
    let fields = match payload {
        Value::Object(fields) if !fields.is_empty() => fields,
        _ => return Err(ApiError::validation("Event payload must be provided.")),
    };

    let event = event_from_json(fields)?;

    validate_field!(
        event.event_id == event_id,
        "The event ID in the payload must match the one in the request."
    );

    Ok(event)
}

fn event_from_json(fields: &Map<String, Value>) -> ApiResult<EnrichedAnalyticsEvent> {
    for field in REQUIRED_FIELDS {
        required_str(fields, field)?;
    }

    let event_category = required_str(fields, "eventCategory")?
        .parse::<EventCategory>()
        .map_err(|_| ApiError::validation("Event category is not valid."))?;

    let anonymous_user = required_str(fields, "anonymousUser")?;
    validate_field!(
        matches!(anonymous_user, "0" | "1"),
        "Anonymous user needs to be either 0 or 1."
    );

    let schema_version = required_str(fields, "schemaVersion")?;
    validate_field!(
        schema_version == SUPPORTED_SCHEMA_VERSION,
        "The provided schema version is not supported."
    );

    let timestamp = required_str(fields, "timestamp")?;
    validate_field!(
        is_timestamp_valid(timestamp),
        "The timestamp should be in ISO 8601 format."
    );

    Ok(EnrichedAnalyticsEvent {
        event_id: required_str(fields, "eventId")?.to_string(),
        event_name: required_str(fields, "eventName")?.to_string(),
        event_category,
        event_source: required_str(fields, "eventSource")?.to_string(),
        entity_id: fields.get("entityId").cloned(),
        entity_type: fields.get("entityType").cloned(),
        action: fields.get("action").cloned(),
        tracking_id: required_str(fields, "trackingId")?.to_string(),
        primary_identifier: fields.get("userId").cloned(),
        additional_identifiers: object_field(fields, "additionalIdentifiers"),
        anonymous_user: anonymous_user.to_string(),
        timestamp: timestamp.to_string(),
        event_properties: object_field(fields, "eventProperties"),
        sdk_version: required_str(fields, "sdkVersion")?.to_string(),
        schema_version: schema_version.to_string(),
    })
}

/// Values are presence-checked only: any non-empty string passes.
fn required_str<'a>(fields: &'a Map<String, Value>, field: &str) -> ApiResult<&'a str> {
    match fields.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::validation(format!(
            "Event must have the {field} field provided."
        ))),
    }
}

/// Mapping fields that are missing or not objects become empty mappings.
fn object_field(fields: &Map<String, Value>, field: &str) -> Map<String, Value> {
    fields
        .get(field)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Checks a timestamp against the strict ISO 8601 profile used by the SDKs
pub fn is_timestamp_valid(timestamp: &str) -> bool {
    ISO_8601_REGEX.is_match(timestamp)
}
