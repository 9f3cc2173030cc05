//! Relay messages: everything the server fans out to participants.

use chatrelay_shared::protocol;

/// One line the server broadcasts, tagged by what produced it.
///
/// Only [`RelayMessage::Chat`] ends up in the transcript; the kind decides
/// that, never the text, so a participant typing "has joined the chat" is
/// still recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// A line typed by a participant
    Chat { sender: String, text: String },
    /// A participant completed its join handshake
    Joined { name: String },
    /// A participant disconnected
    Left { name: String },
    /// The server is draining
    ShutdownNotice,
}

impl RelayMessage {
    pub fn chat(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Chat {
            sender: sender.into(),
            text: text.into(),
        }
    }

    pub fn joined(name: impl Into<String>) -> Self {
        Self::Joined { name: name.into() }
    }

    pub fn left(name: impl Into<String>) -> Self {
        Self::Left { name: name.into() }
    }

    /// Render the exact line written to each connection
    pub fn render(&self) -> String {
        match self {
            Self::Chat { sender, text } => protocol::chat_line(sender, text),
            Self::Joined { name } => protocol::joined_line(name),
            Self::Left { name } => protocol::left_line(name),
            Self::ShutdownNotice => protocol::SHUTDOWN_NOTICE.to_string(),
        }
    }

    /// Whether this message belongs in the persisted transcript
    pub fn is_transcribed(&self) -> bool {
        matches!(self, Self::Chat { .. })
    }
}
