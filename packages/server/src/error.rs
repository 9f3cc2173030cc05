//! Error types for running the server.

use std::io;

use thiserror::Error;

/// Server-level errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address is unavailable or already in use
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
