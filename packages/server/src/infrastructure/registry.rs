//! In-memory connection registry.
//!
//! ## 責務
//!
//! - 参加中のコネクション（`ConnectionHandle`）の登録・削除
//! - 登録と同時に、新規コネクションへの挨拶行をキューに積む
//! - ブロードキャスト用のスナップショット取得
//!
//! ## 設計ノート
//!
//! 全ての操作は単一の Mutex の下で行い、ロックはその操作の間だけ保持する。
//! ファンアウトは `snapshot()` で取得したコピーに対して行うため、
//! ロックを保持したままネットワーク書き込みが行われることはない。

use tokio::sync::Mutex;

use crate::domain::{ConnectionHandle, ConnectionId, RegistryError};

/// Shared directory of currently joined connections, in join order
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<Vec<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection whose join handshake completed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateConnection`] if the same connection is
    /// already registered. Display names are not checked.
    pub async fn register(&self, connection: ConnectionHandle) -> Result<(), RegistryError> {
        let mut connections = self.connections.lock().await;
        if connections.iter().any(|c| c.id() == connection.id()) {
            return Err(RegistryError::DuplicateConnection(connection.id()));
        }
        tracing::debug!(
            "Connection {} ('{}') registered",
            connection.id(),
            connection.name()
        );
        connections.push(connection);
        Ok(())
    }

    /// Register a connection and queue its greeting in the same critical section.
    ///
    /// `greeting` receives the display names of everyone already registered, in
    /// join order, and returns the lines to queue for the new connection. A
    /// broadcast can only reach the connection through a snapshot taken after
    /// this returns, so the greeting is always queued first. Queueing is a
    /// channel send, never a socket write.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateConnection`] if the connection is
    /// already registered, or [`RegistryError::Greeting`] if its writer is gone.
    /// The connection is not registered in either case.
    pub async fn register_with_greeting<F>(
        &self,
        connection: ConnectionHandle,
        greeting: F,
    ) -> Result<(), RegistryError>
    where
        F: FnOnce(&[String]) -> Vec<String>,
    {
        let mut connections = self.connections.lock().await;
        if connections.iter().any(|c| c.id() == connection.id()) {
            return Err(RegistryError::DuplicateConnection(connection.id()));
        }

        let others: Vec<String> = connections.iter().map(|c| c.name().to_string()).collect();
        for line in greeting(&others) {
            connection.send_line(line)?;
        }

        tracing::debug!(
            "Connection {} ('{}') registered",
            connection.id(),
            connection.name()
        );
        connections.push(connection);
        Ok(())
    }

    /// Remove a connection; returns `None` if it was already gone
    pub async fn unregister(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        let mut connections = self.connections.lock().await;
        let index = connections.iter().position(|c| c.id() == id)?;
        let removed = connections.remove(index);
        tracing::debug!("Connection {} ('{}') unregistered", id, removed.name());
        Some(removed)
    }

    /// Point-in-time copy of every registered connection, in join order
    pub async fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.connections.lock().await.clone()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().await.iter().any(|c| c.id() == id)
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}
