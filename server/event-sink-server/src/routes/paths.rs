//! Centralized route path constants

/// Event submission endpoints, one per authentication scheme
pub mod events {
    pub const API_KEY_EVENT: &str = "/events/key/v1/:id";
    pub const JWT_EVENT: &str = "/events/jwt/v1/:id";
}
