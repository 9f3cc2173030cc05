//! Shared building blocks for the chatrelay server and client.
//!
//! - [`logger`]: tracing subscriber setup used by both binaries
//! - [`protocol`]: the line-based wire contract (defaults, fixed texts, renderers)
//! - [`time`]: timestamp helpers

pub mod logger;
pub mod protocol;
pub mod time;
