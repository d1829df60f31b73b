use std::{env, net::IpAddr};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use error_common::{log_fatal, EventSinkError, Result};
use event_sink_server::{create_app, server::DEFAULT_PORT, EventSinkServer, ServerConfig};

/// Mini Digital event sink sandbox server
#[derive(Parser, Debug)]
#[command(name = "event-sink-server")]
#[command(about = "Sandbox HTTP endpoint for exercising analytics SDK ingestion and auth flows")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Server port
    #[arg(short, long, env = "ENV_LOCAL_HTTP_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit structured JSON logs
    #[arg(long, env = "EVENT_SINK_JSON_LOGS")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load variables from the .env file before clap reads the environment
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let args = Args::parse();

    init_tracing(args.verbose, args.json_logs)?;

    if !dotenv_loaded {
        info!("No .env file found, using process environment only");
    }

    let result = match build_config(&args) {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        log_fatal("event-sink-server", &e);
        return Err(e);
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<ServerConfig> {
    if args.request_timeout == 0 {
        return Err(EventSinkError::ConfigError(
            "request timeout must be at least one second".to_string(),
        ));
    }

    Ok(ServerConfig {
        host: args.host,
        port: args.port,
        request_timeout: args.request_timeout,
        ..ServerConfig::default()
    })
}

async fn run(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr();
    let name = config.name.clone();

    info!("Starting {}", name);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let app = create_app(EventSinkServer::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EventSinkError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    let actual_addr = listener
        .local_addr()
        .context("Failed to read the listener's local address")?;

    info!("{} is running on port {}", name, actual_addr.port());
    info!("API key events: http://{}/events/key/v1/{{id}}", actual_addr);
    info!("Bearer events:  http://{}/events/jwt/v1/{{id}}", actual_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EventSinkError::ServerError(format!("HTTP server error: {}", e)))?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

fn init_tracing(verbose: bool, json_logs: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let is_production = env::var("EVENT_SINK_ENV").map(|v| v == "production").unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("event_sink_server={},tower_http=info,hyper=info", level).into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json_logs || is_production {
        // Structured JSON logging for production
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .try_init()
    };

    result.map_err(|e| EventSinkError::TelemetryError(format!("Failed to initialize tracing: {}", e)))
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}
