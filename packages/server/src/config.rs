//! Server configuration.

use std::{path::PathBuf, time::Duration};

use chatrelay_shared::protocol::{DEFAULT_HOST, DEFAULT_PORT};

/// Default transcript file, relative to the working directory
pub const DEFAULT_TRANSCRIPT_PATH: &str = "conversation_backup.txt";
/// Seconds between transcript flushes
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 30;
/// Seconds to wait for connection handlers at shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
/// Seconds a new connection has to send its display name
pub const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 30;
/// Longest inbound line accepted, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Runtime settings for [`crate::Server`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port to bind to; 0 picks an ephemeral port
    pub port: u16,
    /// File the transcript is appended to
    pub transcript_path: PathBuf,
    pub flush_interval: Duration,
    pub shutdown_timeout: Duration,
    pub join_timeout: Duration,
    pub max_line_length: usize,
}

impl ServerConfig {
    /// `host:port` string passed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            transcript_path: PathBuf::from(DEFAULT_TRANSCRIPT_PATH),
            flush_interval: Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            join_timeout: Duration::from_secs(DEFAULT_JOIN_TIMEOUT_SECS),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}
