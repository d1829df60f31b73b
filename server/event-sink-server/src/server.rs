use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

/// Port used when `ENV_LOCAL_HTTP_PORT` is not set
pub const DEFAULT_PORT: u16 = 3333;

/// Shared state handed to every handler.
///
/// Nothing in here changes after startup. Requests never share mutable
/// state; the clock is the only input that varies between them.
#[derive(Debug, Clone)]
pub struct EventSinkServer {
    /// Server configuration
    pub config: ServerConfig,
    /// Calendar source for the bearer challenge
    pub clock: Arc<dyn Clock>,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server name, used in startup logs
    pub name: String,
    /// Bind address
    pub host: IpAddr,
    /// Listen port
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl EventSinkServer {
    /// Create a server that reads the real calendar date
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create a server with an injected clock.
    /// This is useful for testing
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }
}

impl ServerConfig {
    /// Address the listener binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Mini Digital API Event Sink / Sandbox Server".to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            request_timeout: 30,
        }
    }
}
