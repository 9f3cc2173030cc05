//! Chat relay server.
//!
//! Accepts TCP participants, relays each line to everyone else and backs the
//! conversation up to a transcript file periodically.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatrelay-server
//! cargo run --bin chatrelay-server -- --host 0.0.0.0 --port 5000 --transcript chat.log
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use chatrelay_server::{
    Server, ServerConfig,
    config::{
        DEFAULT_FLUSH_INTERVAL_SECS, DEFAULT_JOIN_TIMEOUT_SECS, DEFAULT_MAX_LINE_LENGTH,
        DEFAULT_SHUTDOWN_TIMEOUT_SECS, DEFAULT_TRANSCRIPT_PATH,
    },
    infrastructure::FileTranscriptStore,
    shutdown_signal,
};
use chatrelay_shared::{
    logger::setup_logger,
    protocol::{DEFAULT_HOST, DEFAULT_PORT},
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatrelay-server")]
#[command(about = "TCP chat relay server with periodic transcript backup", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// File the conversation is appended to
    #[arg(short = 't', long, default_value = DEFAULT_TRANSCRIPT_PATH)]
    transcript: PathBuf,

    /// Seconds between transcript backups
    #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    flush_interval: u64,

    /// Seconds to wait for connections to close on shutdown
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    shutdown_timeout: u64,

    /// Seconds a new connection has to send its display name
    #[arg(long, default_value_t = DEFAULT_JOIN_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    join_timeout: u64,

    /// Longest accepted line, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            transcript_path: args.transcript,
            flush_interval: Duration::from_secs(args.flush_interval),
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            join_timeout: Duration::from_secs(args.join_timeout),
            max_line_length: args.max_line_length,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = ServerConfig::from(args);
    let store = Arc::new(FileTranscriptStore::new(&config.transcript_path));

    let server = match Server::bind(config, store).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };

    server.run(shutdown_signal()).await;
}
