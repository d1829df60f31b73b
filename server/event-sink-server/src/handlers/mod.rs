//! HTTP request handlers for the event sink.
//!
//! - `events` - event submission on the two auth-scoped paths
//! - `fallback` - method-not-allowed and not-found responses

pub mod events;
pub mod fallback;

pub use events::{post_event_with_api_key, post_event_with_jwt};
pub use fallback::{method_not_allowed, not_found};
