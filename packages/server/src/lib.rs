//! TCP chat relay server.
//!
//! Participants connect over TCP, name themselves with their first line, and
//! from then on every line they send is relayed to everyone else. Chat lines
//! are buffered and appended to a transcript file on a timer.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;

pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::{Server, shutdown_signal};
