//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "parley-server", about = "Multi-turn chat generation over HTTP")]
pub struct ServerArgs {
    /// Interface to bind.
    #[arg(long, env = "PARLEY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database holding the model catalog and ratings.
    #[arg(long, env = "PARLEY_DATABASE", default_value = "parley.db")]
    pub database: PathBuf,

    /// Seconds a conversation token stays valid after it is issued.
    #[arg(long, env = "PARLEY_SESSION_TTL_SECS", default_value_t = 600)]
    pub session_ttl_secs: u64,

    /// Seconds between sweeps of expired conversations.
    #[arg(long, env = "PARLEY_SWEEP_INTERVAL_SECS", default_value_t = 5)]
    pub sweep_interval_secs: u64,

    /// Base log level (trace, debug, info, warn, error).
    #[arg(long, env = "PARLEY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// "pretty" or "json".
    #[arg(long, env = "PARLEY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl ServerArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Never zero; `tokio::time::interval` panics on a zero period.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
