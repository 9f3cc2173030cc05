//! Error types for the chat client.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached
    #[error("Could not connect to server at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The established connection failed
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// A frame could not be encoded or decoded
    #[error("Protocol error: {0}")]
    Codec(#[from] LinesCodecError),
}
