//! Terminal client for the chatrelay server.
//!
//! Speaks the line protocol from `chatrelay_shared::protocol`: the first line
//! sent is the display name, every later line is a chat message.

mod domain;
pub mod error;
mod runner;
mod session;
mod ui;

pub use domain::SessionEnd;
pub use error::ClientError;
pub use runner::run_client;
