//! Domain layer: connections, relay messages and the transcript.
//!
//! Nothing in here touches a socket or the filesystem; the infrastructure
//! layer provides the concrete registry and transcript store.

pub mod connection;
pub mod error;
pub mod message;
pub mod transcript;

pub use connection::{ConnectionHandle, ConnectionId, Outbound, OutboundSender};
pub use error::{PushError, RegistryError, TranscriptError};
pub use message::RelayMessage;
pub use transcript::{TranscriptBuffer, TranscriptStore};

#[cfg(test)]
pub use transcript::MockTranscriptStore;
