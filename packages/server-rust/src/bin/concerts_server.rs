//! Concerts server binary.
//!
//! Parses configuration from flags and environment, installs the tracing
//! subscriber, and serves until Ctrl-C.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use concerts_server::{NetworkConfig, NetworkModule};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// In-memory concert records over HTTP, in JSON or MessagePack.
#[derive(Debug, Parser)]
#[command(name = "concerts-server", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, env = "CONCERTS_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (0 picks a free port).
    #[arg(long, env = "CONCERTS_PORT", default_value_t = 8080)]
    port: u16,

    /// Allowed CORS origin; repeat for several. `*` allows any.
    #[arg(
        long = "cors-origin",
        env = "CONCERTS_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    cors_origins: Vec<String>,

    /// Maximum seconds a request may take before a 408.
    #[arg(long, env = "CONCERTS_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long, env = "CONCERTS_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    drain_timeout_secs: u64,

    /// Log output format. Filtering follows `RUST_LOG` (default `info`).
    #[arg(long, env = "CONCERTS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Args {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
            ..NetworkConfig::default()
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let mut module = NetworkModule::new(args.network_config());
    let port = module.start().await?;
    info!(port, "Starting concerts service");

    module.serve(shutdown_signal()).await?;
    info!("Concerts service stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_network_config() {
        let args = Args::parse_from([
            "concerts-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--cors-origin",
            "http://a.example,http://b.example",
            "--request-timeout-secs",
            "5",
            "--log-format",
            "json",
        ]);
        let config = args.network_config();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.cors_origins, vec!["http://a.example", "http://b.example"]);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
