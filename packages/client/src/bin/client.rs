//! Terminal chat client for the chatrelay server.
//!
//! Connects to the relay server, joins under the given display name and relays
//! lines typed on stdin. Exits when the server shuts down or the connection is lost.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatrelay-client -- alice
//! cargo run --bin chatrelay-client -- bob --host 127.0.0.1 --port 4321
//! ```

use clap::Parser;

use chatrelay_client::{ClientError, run_client};
use chatrelay_shared::{
    logger::setup_logger,
    protocol::{DEFAULT_HOST, DEFAULT_PORT},
};

#[derive(Parser, Debug)]
#[command(name = "chatrelay-client")]
#[command(about = "Terminal chat client for the chatrelay server", long_about = None)]
struct Args {
    /// Display name shown to the other participants
    name: String,

    /// Server address
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    match run_client(args.host, args.port, args.name).await {
        Ok(_) => {}
        Err(ClientError::Connect { addr, source }) => {
            tracing::debug!("Failed to connect to {}: {}", addr, source);
            eprintln!("Error: Could not connect to server. Please make sure the server is running.");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Client error: {}", e);
            std::process::exit(1);
        }
    }
}
