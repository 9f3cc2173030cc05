//! Transcript buffer and the storage seam it is flushed into.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::TranscriptError;

/// In-memory, append-only sequence of relay lines awaiting the next flush.
///
/// Append order equals broadcast order. The lock is held only for the append
/// or the drain itself.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    lines: Mutex<Vec<String>>,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one rendered relay line
    pub async fn append(&self, line: String) {
        self.lines.lock().await.push(line);
    }

    /// Swap the buffered lines out for an empty buffer and return them
    pub async fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().await)
    }

    /// Number of lines waiting for the next flush
    pub async fn len(&self) -> usize {
        self.lines.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.lock().await.is_empty()
    }
}

/// Durable storage for drained transcript lines
///
/// The flush use case depends on this trait; the file-backed implementation
/// lives in the infrastructure layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append `lines` in order, one per line
    async fn append(&self, lines: &[String]) -> Result<(), TranscriptError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_preserves_order() {
        // テスト項目: 追加順に行が保持される
        // given (前提条件):
        let buffer = TranscriptBuffer::new();

        // when (操作):
        buffer.append("alice: one".to_string()).await;
        buffer.append("bob: two".to_string()).await;
        buffer.append("alice: three".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            buffer.drain().await,
            vec!["alice: one", "bob: two", "alice: three"]
        );
    }

    #[tokio::test]
    async fn test_drain_clears_buffer() {
        // テスト項目: drain 後はバッファが空になり、二度目の drain は空を返す
        // given (前提条件):
        let buffer = TranscriptBuffer::new();
        buffer.append("alice: hi".to_string()).await;

        // when (操作):
        let first = buffer.drain().await;
        let second = buffer.drain().await;

        // then (期待する結果):
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(buffer.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        // テスト項目: 並行した追加でも行が失われない
        // given (前提条件):
        let buffer = std::sync::Arc::new(TranscriptBuffer::new());

        // when (操作):
        let mut tasks = Vec::new();
        for sender in 0..8 {
            let buffer = buffer.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..25 {
                    buffer.append(format!("user{}: {}", sender, i)).await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // then (期待する結果):
        let lines = buffer.drain().await;
        assert_eq!(lines.len(), 200);
        // per-sender order is preserved
        let user3: Vec<&String> = lines.iter().filter(|l| l.starts_with("user3:")).collect();
        let expected: Vec<String> = (0..25).map(|i| format!("user3: {}", i)).collect();
        assert_eq!(user3, expected.iter().collect::<Vec<_>>());
    }
}
