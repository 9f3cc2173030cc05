//! Connection entity: one joined participant.

use std::{
    fmt,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::mpsc;
use uuid::Uuid;

use chatrelay_shared::time::now_millis;

use super::error::PushError;

/// Identity of one accepted connection.
///
/// Display names are not unique, so the registry keys on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh, random connection ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Command for a connection's outbound writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Write one line (the writer appends the `\n` terminator)
    Line(String),
    /// Flush what is queued before this command, then shut the write half down
    Close,
}

/// Sending side of a connection's outbound queue
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Non-owning handle to a joined connection.
///
/// The transport itself is owned by the connection's handler and writer tasks;
/// this handle only queues output for the writer. Clones share the same
/// liveness flag.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    name: String,
    peer_addr: SocketAddr,
    /// Unix timestamp when the handshake completed (milliseconds)
    connected_at: i64,
    outbound: OutboundSender,
    closing: Arc<AtomicBool>,
}

impl ConnectionHandle {
    /// Create a handle for a participant that just named itself
    pub fn new(name: impl Into<String>, peer_addr: SocketAddr, outbound: OutboundSender) -> Self {
        Self {
            id: ConnectionId::generate(),
            name: name.into(),
            peer_addr,
            connected_at: now_millis(),
            outbound,
            closing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }

    /// `false` once the connection is being force-closed or its writer is gone
    pub fn is_alive(&self) -> bool {
        !self.closing.load(Ordering::SeqCst) && !self.outbound.is_closed()
    }

    /// Queue one line for this connection.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Disconnected`] if the writer task has already exited.
    pub fn send_line(&self, line: impl Into<String>) -> Result<(), PushError> {
        self.outbound
            .send(Outbound::Line(line.into()))
            .map_err(|_| PushError::Disconnected(self.id))
    }

    /// Queue `notice` followed by a close command.
    ///
    /// Only the first call on any clone of this handle queues anything; later
    /// calls return `false`.
    pub fn force_close(&self, notice: &str) -> bool {
        if self.closing.swap(true, Ordering::SeqCst) {
            return false;
        }
        let notice_queued = self
            .outbound
            .send(Outbound::Line(notice.to_string()))
            .is_ok();
        let close_queued = self.outbound.send(Outbound::Close).is_ok();
        if !(notice_queued && close_queued) {
            tracing::debug!(
                "Writer for connection {} already gone while force-closing",
                self.id
            );
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        // テスト項目: 生成される ConnectionId は毎回異なる
        // given (前提条件):

        // when (操作):
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }

    #[test]
    fn test_send_line_queues_outbound_line() {
        // テスト項目: send_line で行が送信キューに積まれる
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new("alice", test_addr(), tx);

        // when (操作):
        let result = handle.send_line("hello");

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.try_recv().unwrap(), Outbound::Line("hello".to_string()));
    }

    #[test]
    fn test_send_line_fails_when_writer_is_gone() {
        // テスト項目: writer 終了後の send_line は Disconnected エラーになる
        // given (前提条件):
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new("alice", test_addr(), tx);
        drop(rx);

        // when (操作):
        let result = handle.send_line("hello");

        // then (期待する結果):
        assert_eq!(result, Err(PushError::Disconnected(handle.id())));
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_force_close_queues_notice_then_close_once() {
        // テスト項目: force_close は通知と Close を一度だけ積む（クローン間で共有）
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new("alice", test_addr(), tx);
        let clone = handle.clone();

        // when (操作):
        let first = handle.force_close("bye");
        let second = clone.force_close("bye");

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(!clone.is_alive());
        assert_eq!(rx.try_recv().unwrap(), Outbound::Line("bye".to_string()));
        assert_eq!(rx.try_recv().unwrap(), Outbound::Close);
        assert!(rx.try_recv().is_err());
    }
}
