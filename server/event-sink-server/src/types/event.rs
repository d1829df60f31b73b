//! Analytics event record accepted by the sink

use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::{Map, Value};

/// Only schema version the sink understands
pub const SUPPORTED_SCHEMA_VERSION: &str = "1.0.0";

/// Fields every event must carry as non-empty strings, in the order they are
/// checked.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "eventId",
    "eventName",
    "eventCategory",
    "timestamp",
    "eventSource",
    "trackingId",
    "primaryIdentifier",
    "anonymousUser",
    "sdkVersion",
    "schemaVersion",
];

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    ScreenViewEvent,
    UserOutcomeEvent,
    SystemOutcomeEvent,
    ContentEvent,
    InteractionEvent,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::ScreenViewEvent,
        EventCategory::UserOutcomeEvent,
        EventCategory::SystemOutcomeEvent,
        EventCategory::ContentEvent,
        EventCategory::InteractionEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::ScreenViewEvent => "screen_view_event",
            EventCategory::UserOutcomeEvent => "user_outcome_event",
            EventCategory::SystemOutcomeEvent => "system_outcome_event",
            EventCategory::ContentEvent => "content_event",
            EventCategory::InteractionEvent => "interaction_event",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A validated analytics event.
///
/// Built once per request from the raw JSON body and dropped with the
/// response. Optional fields are carried exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAnalyticsEvent {
    pub event_id: String,
    pub event_name: String,
    pub event_category: EventCategory,
    pub event_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    pub tracking_id: String,
    /// Read from the `userId` key of the wire payload, not `primaryIdentifier`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_identifier: Option<Value>,
    pub additional_identifiers: Map<String, Value>,
    /// "0" or "1"
    pub anonymous_user: String,
    pub timestamp: String,
    pub event_properties: Map<String, Value>,
    pub sdk_version: String,
    pub schema_version: String,
}
