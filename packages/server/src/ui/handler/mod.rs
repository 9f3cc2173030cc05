//! Per-connection tasks.

mod connection;
mod writer;

pub(crate) use connection::handle_connection;
