use thiserror::Error;

/// Errors that terminate the event sink process
#[derive(Error, Debug)]
pub enum EventSinkError {
    /// Network setup errors (binding, local address lookup)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The HTTP server loop exited with an error
    #[error("Server error: {0}")]
    ServerError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Logging/tracing setup errors
    #[error("Telemetry error: {0}")]
    TelemetryError(String),

    /// Wrapped external errors, usually an I/O failure with `anyhow` context
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EventSinkError {
    /// Short, stable name used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            EventSinkError::NetworkError(_) => "network",
            EventSinkError::ServerError(_) => "server",
            EventSinkError::ConfigError(_) => "config",
            EventSinkError::TelemetryError(_) => "telemetry",
            EventSinkError::Other(_) => "other",
        }
    }
}

/// Result type alias for event sink process operations
pub type Result<T> = std::result::Result<T, EventSinkError>;

/// Logs a fatal error before the process exits
pub fn log_fatal(context: &str, error: &EventSinkError) {
    tracing::error!(
        context = context,
        kind = error.kind(),
        error = %error,
        "Event sink stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_category() {
        let err = EventSinkError::NetworkError("address in use".to_string());
        assert_eq!(err.to_string(), "Network error: address in use");
        assert_eq!(err.kind(), "network");
    }

    #[test]
    fn test_io_error_with_context_becomes_other() {
        use anyhow::Context;

        fn local_addr() -> Result<()> {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotConnected, "socket closed"))
                .context("Failed to read the listener's local address")?;
            Ok(())
        }

        let err = local_addr().unwrap_err();
        assert_eq!(err.kind(), "other");
        assert_eq!(err.to_string(), "Failed to read the listener's local address");
    }

    #[test]
    fn test_anyhow_errors_are_transparent() {
        let err: EventSinkError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.kind(), "other");
    }
}
