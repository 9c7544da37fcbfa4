use clap::Parser;
use std::{net::SocketAddr, time::Duration};

/// Runtime settings for the fertilizer endpoint.
///
/// Every flag falls back to an environment variable, which may come from a
/// `.env` file loaded at startup.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Soil fertilizer recommendation endpoint")]
pub struct ServerConfig {
    /// Address to bind the HTTP server
    #[arg(long, env = "FERTILIZER_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Artificial processing delay before a recommendation is returned, in milliseconds
    #[arg(long = "delay-ms", env = "FERTILIZER_DELAY_MS", default_value_t = 500)]
    pub delay_ms: u64,

    /// Largest accepted request body in bytes
    #[arg(long, env = "FERTILIZER_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "FERTILIZER_LOG", default_value = "info")]
    pub log: String,
}

/// A 5 MB image grows by a third when base64 encoded; leave headroom.
pub const DEFAULT_BODY_LIMIT: usize = 8 * 1024 * 1024;

impl ServerConfig {
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
