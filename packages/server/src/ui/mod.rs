//! TCP front end: accept loop, per-connection handlers and signal handling.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use signal::shutdown_signal;
