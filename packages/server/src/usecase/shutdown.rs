//! UseCase: シャットダウン処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ShutdownCoordinator::initiate() と wait_for_handlers()
//!
//! ### なぜこのテストが必要か
//! - 全コネクションにシャットダウン通知が届き、切断されることを保証
//! - 二度目の割り込みが何もしない（冪等）ことを確認
//! - ハンドラが終わらない場合でもタイムアウトで待機を打ち切ることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中のコネクションがある状態でのシャットダウン
//! - エッジケース：繰り返しの割り込み、終了しないハンドラ

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{domain::RelayMessage, infrastructure::ConnectionRegistry};

/// Server-wide shutdown state shared by the accept loop, every connection
/// task and the flush timer.
///
/// The draining flag is set once and never reset. Every connection handler
/// and outbound writer is spawned on [`ShutdownContext::tracker`] so shutdown
/// can wait for them.
#[derive(Debug, Clone, Default)]
pub struct ShutdownContext {
    draining: Arc<AtomicBool>,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl ShutdownContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Set the draining flag; returns `true` only for the call that set it
    fn begin_draining(&self) -> bool {
        !self.draining.swap(true, Ordering::SeqCst)
    }

    /// Token cancelled once every registered connection has been told to close
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }
}

/// シャットダウンのユースケース
pub struct ShutdownCoordinator {
    /// 共有のシャットダウン状態
    context: ShutdownContext,
    /// 参加中のコネクション
    registry: Arc<ConnectionRegistry>,
}

impl ShutdownCoordinator {
    /// 新しい ShutdownCoordinator を作成
    pub fn new(context: ShutdownContext, registry: Arc<ConnectionRegistry>) -> Self {
        Self { context, registry }
    }

    /// Start draining the server.
    ///
    /// Sets the draining flag, queues the shutdown notice followed by a close
    /// command on every registered connection, then cancels the shared token
    /// so the accept loop stops and blocked reads return.
    ///
    /// # Returns
    ///
    /// `false` if shutdown was already in progress; nothing is done then.
    pub async fn initiate(&self) -> bool {
        if !self.context.begin_draining() {
            tracing::debug!("Shutdown already in progress, ignoring repeated request");
            return false;
        }

        let notice = RelayMessage::ShutdownNotice.render();
        let connections = self.registry.snapshot().await;
        tracing::info!(
            "Shutting down server, disconnecting {} connection(s)",
            connections.len()
        );

        for connection in &connections {
            if connection.force_close(&notice) {
                tracing::debug!("Force-closing '{}'", connection.name());
            }
        }

        self.context.token.cancel();
        true
    }

    /// Wait for every tracked connection task to exit, at most `timeout`.
    ///
    /// # Returns
    ///
    /// `true` if all tasks finished in time.
    pub async fn wait_for_handlers(&self, timeout: Duration) -> bool {
        let tracker = self.context.tracker();
        tracker.close();
        match tokio::time::timeout(timeout, tracker.wait()).await {
            Ok(()) => {
                tracing::info!("All connection handlers finished");
                true
            }
            Err(_) => {
                tracing::warn!(
                    "{} connection task(s) still running after {:?}, giving up on them",
                    tracker.len(),
                    timeout
                );
                false
            }
        }
    }
}
