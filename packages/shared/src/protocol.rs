//! Line-based wire contract between the relay server and its clients.
//!
//! Every frame is one UTF-8 line terminated by `\n`. The first frame a client
//! sends is its display name; every later frame is a chat line. Everything the
//! server sends is rendered by the functions in this module.

/// Default listen / connect address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen / connect port
pub const DEFAULT_PORT: u16 = 4321;

/// Sent to every participant right before the server closes their connection.
///
/// Clients compare incoming lines against this literal exactly.
pub const SHUTDOWN_NOTICE: &str = "Server is shutting down. You will be disconnected.";

/// First private line sent to a participant after it joins.
pub fn connected_line(address: impl std::fmt::Display, port: u16) -> String {
    format!(
        "Connected to the server with IP: {} and Port: {}",
        address, port
    )
}

/// Second private line sent to a participant after it joins.
///
/// `others` are the display names of everyone already in the chat, in join order.
pub fn welcome_line(name: &str, others: &[String]) -> String {
    if others.is_empty() {
        format!("You joined the chat as {}. You are the first to join.", name)
    } else {
        format!(
            "You joined the chat as {}. Others in the chat: {}",
            name,
            others.join(", ")
        )
    }
}

/// Relay line for an ordinary chat message.
pub fn chat_line(sender: &str, text: &str) -> String {
    format!("{}: {}", sender, text)
}

/// Announcement broadcast when a participant joins.
pub fn joined_line(name: &str) -> String {
    format!("{} has joined the chat", name)
}

/// Announcement broadcast when a participant leaves.
pub fn left_line(name: &str) -> String {
    format!("{} has left the chat", name)
}
