//! Domain types shared by handlers and validation

pub mod event;

pub use event::{EnrichedAnalyticsEvent, EventCategory, REQUIRED_FIELDS, SUPPORTED_SCHEMA_VERSION};
