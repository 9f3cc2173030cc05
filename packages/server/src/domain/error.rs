//! Error types for the relay domain.

use std::{io, path::PathBuf};

use thiserror::Error;

use super::connection::ConnectionId;

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The same connection was registered twice
    #[error("Connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    /// The greeting could not be queued for the new connection
    #[error("Failed to greet new connection: {0}")]
    Greeting(#[from] PushError),
}

/// Errors queueing output for a connection
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    /// The connection's writer task has exited
    #[error("Connection {0} is no longer accepting output")]
    Disconnected(ConnectionId),
}

/// Transcript persistence errors
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The transcript file could not be opened or written
    #[error("Failed to write transcript to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
