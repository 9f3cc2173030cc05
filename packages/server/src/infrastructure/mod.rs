//! Infrastructure layer: the shared connection registry and transcript storage.

pub mod registry;
pub mod transcript_store;

pub use registry::ConnectionRegistry;
pub use transcript_store::FileTranscriptStore;
