//! UseCase: ブロードキャスト処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastUseCase::execute() メソッド
//! - 除外指定、トランスクリプトへの追記、一部送信失敗時の継続
//!
//! ### なぜこのテストが必要か
//! - 送信者自身にメッセージが返らないことを保証
//! - Chat 以外（入退室アナウンス）が記録されないことを保証
//! - 一つのコネクションの失敗が他への配信を止めないことを確認
//! - 並行した送信でも、配信順とトランスクリプトの記録順が一致することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数コネクションへの配信
//! - 異常系：writer が終了済みのコネクションが混在
//! - エッジケース：登録コネクションが無い状態での配信
//! - 並行性：複数の送信者が同時にブロードキャスト

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionHandle, ConnectionId, RelayMessage, TranscriptBuffer},
    infrastructure::ConnectionRegistry,
};

/// ブロードキャストのユースケース
pub struct BroadcastUseCase {
    /// 参加中のコネクション
    registry: Arc<ConnectionRegistry>,
    /// 次回フラッシュ待ちのトランスクリプト
    transcript: Arc<TranscriptBuffer>,
    /// 追記からキュー投入までを直列化する
    fan_out: Mutex<()>,
}

impl BroadcastUseCase {
    /// 新しい BroadcastUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>, transcript: Arc<TranscriptBuffer>) -> Self {
        Self {
            registry,
            transcript,
            fan_out: Mutex::new(()),
        }
    }

    /// Render `message`, record it if it is a chat line, and fan it out to
    /// every registered connection except `exclude`.
    ///
    /// # Returns
    ///
    /// The number of connections the line was queued for. A connection whose
    /// writer is gone is logged and skipped; it is not removed here, its own
    /// handler does that.
    ///
    /// Calls are serialized from the transcript append through the last
    /// enqueue, so every connection receives lines in transcript order.
    pub async fn execute(&self, message: &RelayMessage, exclude: Option<ConnectionId>) -> usize {
        let line = message.render();
        let _fan_out = self.fan_out.lock().await;

        if message.is_transcribed() {
            self.transcript.append(line.clone()).await;
        }

        let targets = self.registry.snapshot().await;
        deliver(&line, &targets, exclude)
    }
}

/// Queue `line` for each target except `exclude`; returns how many succeeded
fn deliver(line: &str, targets: &[ConnectionHandle], exclude: Option<ConnectionId>) -> usize {
    let mut delivered = 0;
    for target in targets {
        if Some(target.id()) == exclude || !target.is_alive() {
            continue;
        }
        match target.send_line(line) {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!("Failed to relay to '{}': {}", target.name(), e),
        }
    }
    delivered
}
