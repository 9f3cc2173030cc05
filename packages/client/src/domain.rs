//! Domain logic for client-side operations.
//!
//! Pure functions without side effects, kept apart from the socket handling.

use chatrelay_shared::protocol::SHUTDOWN_NOTICE;

/// How a session came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server announced shutdown and the client said goodbye
    ServerShutdown,
    /// The server closed the connection without notice
    ConnectionLost,
    /// The local user closed the input (Ctrl-C / Ctrl-D)
    UserExit,
}

/// A line received from the server, classified
#[derive(Debug, PartialEq, Eq)]
pub enum Incoming<'a> {
    ShutdownNotice,
    Line(&'a str),
}

/// Classify an incoming line.
///
/// Only an exact match of the shutdown notice counts; a chat line that merely
/// contains the notice text is an ordinary line.
pub fn classify(line: &str) -> Incoming<'_> {
    if line == SHUTDOWN_NOTICE {
        Incoming::ShutdownNotice
    } else {
        Incoming::Line(line)
    }
}

/// The text to send for a line typed by the user; `None` when it is entirely blank.
///
/// Anything else is sent exactly as typed, surrounding whitespace included.
pub fn outgoing_text(input: &str) -> Option<&str> {
    if input.trim().is_empty() { None } else { Some(input) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exact_shutdown_notice() {
        // テスト項目: シャットダウン通知と完全一致する行は通知として判定される
        // given (前提条件):
        let line = SHUTDOWN_NOTICE;

        // when (操作):
        let result = classify(line);

        // then (期待する結果):
        assert_eq!(result, Incoming::ShutdownNotice);
    }

    #[test]
    fn test_classify_chat_line_containing_notice() {
        // テスト項目: 通知文を含むだけのチャット行は通常の行として判定される
        // given (前提条件):
        let line = format!("mallory: {}", SHUTDOWN_NOTICE);

        // when (操作):
        let result = classify(&line);

        // then (期待する結果):
        assert_eq!(result, Incoming::Line(line.as_str()));
    }

    #[test]
    fn test_outgoing_text_skips_blank_input() {
        // テスト項目: 空白だけの入力は送信対象にならない
        // given (前提条件):
        let inputs = ["", "   ", "\t"];

        // when (操作):
        let results: Vec<_> = inputs.iter().map(|input| outgoing_text(input)).collect();

        // then (期待する結果):
        assert!(results.iter().all(Option::is_none));
    }

    #[test]
    fn test_outgoing_text_keeps_input_as_typed() {
        // テスト項目: 空白だけでない入力は前後の空白も含めてそのまま送信される
        // given (前提条件):
        let input = "  hello there ";

        // when (操作):
        let result = outgoing_text(input);

        // then (期待する結果):
        assert_eq!(result, Some("  hello there "));
    }
}
