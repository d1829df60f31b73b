pub mod paths;

use axum::{routing::post, Router};

use crate::{handlers, server::EventSinkServer};

/// Create event submission routes.
///
/// Each path binds its own authentication scheme. POST is the only method
/// handled; every other method gets a 405 without touching auth or the body.
pub fn event_routes() -> Router<EventSinkServer> {
    Router::new()
        .route(
            paths::events::API_KEY_EVENT,
            post(handlers::post_event_with_api_key).fallback(handlers::method_not_allowed),
        )
        .route(
            paths::events::JWT_EVENT,
            post(handlers::post_event_with_jwt).fallback(handlers::method_not_allowed),
        )
}

/// Create all application routes
pub fn create_routes() -> Router<EventSinkServer> {
    Router::new()
        .merge(event_routes())
        // Any other route will 404
        .fallback(handlers::not_found)
}
