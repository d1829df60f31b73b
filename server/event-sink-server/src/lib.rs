//! Mini Digital event sink - sandbox analytics ingestion API
//!
//! A stand-in for the production event collector. It authenticates and
//! validates analytics events sent by the client SDKs and acknowledges them;
//! nothing is stored or forwarded.

pub mod auth;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::*;
pub use server::{EventSinkServer, ServerConfig};

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Create the main application router with all routes and middleware
///
/// Requests pass through, outermost first: tracing, timing logs, security
/// headers, the `OPTIONS` short-circuit, panic recovery, the timeout, and
/// finally routing.
pub fn create_app(server: EventSinkServer) -> Router {
    let timeout = server.config.request_timeout_duration();

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(from_fn(middleware::security_headers_middleware))
                .layer(from_fn(middleware::preflight_middleware))
                .layer(CatchPanicLayer::custom(middleware::handle_panic))
                .layer(from_fn_with_state(timeout, middleware::timeout_middleware)),
        )
        .with_state(server)
}
