//! Transcript storage implementations
//!
//! - `file`: append-only text file, one relay line per line

pub mod file;

pub use file::FileTranscriptStore;
