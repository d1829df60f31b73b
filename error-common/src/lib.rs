//! Common error handling for the Mini Digital event sink
//!
//! Request-level failures are HTTP concerns and live next to the handlers in
//! the server crate. This crate holds the errors that end the process:
//! configuration problems, failure to bind the listener, and a server loop
//! that exits abnormally.
//!
//! # Example
//!
//! ```rust
//! use error_common::{EventSinkError, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| EventSinkError::ConfigError(format!("invalid port: {raw}")))
//! }
//!
//! assert!(parse_port("3333").is_ok());
//! assert!(parse_port("not-a-port").is_err());
//! ```

pub mod types;

pub use types::*;
