//! UseCase: トランスクリプトの定期フラッシュ
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FlushTranscriptUseCase::execute() と run_periodic()
//!
//! ### なぜこのテストが必要か
//! - フラッシュを繰り返しても行の重複・欠落が無いことを保証
//! - 保存失敗がタイマーを止めないこと（ベストエフォート）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数回のフラッシュ
//! - 異常系：保存先に書き込めない
//! - エッジケース：空バッファ、シャットダウンによる停止

use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::{TranscriptBuffer, TranscriptError, TranscriptStore};

/// トランスクリプトフラッシュのユースケース
pub struct FlushTranscriptUseCase {
    /// フラッシュ対象のバッファ
    transcript: Arc<TranscriptBuffer>,
    /// TranscriptStore（永続化の抽象化）
    store: Arc<dyn TranscriptStore>,
}

impl FlushTranscriptUseCase {
    /// 新しい FlushTranscriptUseCase を作成
    pub fn new(transcript: Arc<TranscriptBuffer>, store: Arc<dyn TranscriptStore>) -> Self {
        Self { transcript, store }
    }

    /// Drain the buffer and append the drained lines to the store.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - `n` lines were persisted (0 when the buffer was empty)
    /// * `Err(TranscriptError)` - the store failed; the drained lines are dropped
    pub async fn execute(&self) -> Result<usize, TranscriptError> {
        let lines = self.transcript.drain().await;
        if lines.is_empty() {
            return Ok(0);
        }
        self.store.append(&lines).await?;
        Ok(lines.len())
    }

    /// Flush every `period` until `token` is cancelled.
    ///
    /// The first flush happens one full period after start. Failures are
    /// logged and the timer keeps running.
    pub async fn run_periodic(self: Arc<Self>, period: Duration, token: CancellationToken) {
        let period = period.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => self.flush_and_log().await,
            }
        }
        tracing::debug!("Transcript flush timer stopped");
    }

    async fn flush_and_log(&self) {
        match self.execute().await {
            Ok(0) => tracing::debug!("Transcript flush: nothing to back up"),
            Ok(n) => tracing::info!("Conversation backed up ({} line(s))", n),
            Err(e) => tracing::error!("Transcript flush failed, buffered lines dropped: {}", e),
        }
    }
}
