//! スキャンパイプライン
//!
//! 入力画像 → 分類 → 履歴追加 の流れと状態を管理する。
//! 分類中は新しい入力を受け付けない。

use crate::classifier::Classifier;
use crate::error::{EcoScanError, Result};
use crate::history::{new_history_id, HistoryStore, Persistence};
use chrono::{SecondsFormat, Utc};
use ecoscan_common::{HistoryItem, ImageInput};
use std::time::Duration;

/// 1スキャンあたりの固定ポイント
pub const SCAN_REWARD_POINTS: u32 = 10;

const CANCELLED_MESSAGE: &str = "Classification was cancelled";

/// 分類のタイムアウト既定値
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Capturing,
    /// 分類中（プレビューはData URI）
    Classifying { preview: String },
    Succeeded { item: HistoryItem },
    /// 失敗（撮影画像は残す）
    Failed { preview: String, message: String },
}

impl ScanState {
    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Capturing => "capturing",
            ScanState::Classifying { .. } => "classifying",
            ScanState::Succeeded { .. } => "succeeded",
            ScanState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Succeeded { .. } | ScanState::Failed { .. })
    }

    /// 表示中の画像（Data URI）
    pub fn preview(&self) -> Option<&str> {
        match self {
            ScanState::Classifying { preview } | ScanState::Failed { preview, .. } => Some(preview),
            ScanState::Succeeded { item } => Some(&item.image),
            ScanState::Idle | ScanState::Capturing => None,
        }
    }
}

/// 成功時の結果
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub item: HistoryItem,
    pub persistence: Persistence,
}

pub struct ScanPipeline<C: Classifier> {
    classifier: C,
    state: ScanState,
    timeout: Duration,
}

impl<C: Classifier> ScanPipeline<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            state: ScanState::Idle,
            timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// カメラ・ファイル選択の開始（idle/終了状態から）
    pub fn begin_capture(&mut self) -> Result<()> {
        self.ensure_not_classifying()?;
        self.state = ScanState::Capturing;
        Ok(())
    }

    /// 撮影を中止して待機に戻る
    pub fn cancel_capture(&mut self) {
        if self.state == ScanState::Capturing {
            self.state = ScanState::Idle;
        }
    }

    /// 「もう一度スキャン」: 画像・結果・エラーを消して待機に戻る
    pub fn scan_again(&mut self) -> Result<()> {
        self.ensure_not_classifying()?;
        self.state = ScanState::Idle;
        Ok(())
    }

    /// 入力画像を分類し、成功したら履歴に追加する
    ///
    /// 分類失敗はFailed状態に遷移してエラーを返す（履歴は変更しない）。
    /// 途中でfutureが破棄された場合もFailedに戻る。
    pub async fn submit(&mut self, store: &mut HistoryStore, input: ImageInput) -> Result<ScanOutcome> {
        self.ensure_not_classifying()?;

        let preview = input.to_data_uri();
        let guard = ClassifyingGuard::enter(&mut self.state, preview.clone());
        tracing::info!(mime_type = %input.mime_type, "classifying image");

        let classified = match tokio::time::timeout(self.timeout, self.classifier.classify(&input)).await {
            Ok(result) => result,
            Err(_) => Err(EcoScanError::ClassificationTimeout(self.timeout.as_secs())),
        };

        let result = match classified {
            Ok(result) => result,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("classification failed: {}", message);
                guard.finish(ScanState::Failed { preview, message });
                return Err(e);
            }
        };

        let now = Utc::now();
        let item = HistoryItem {
            id: new_history_id(now),
            image: preview,
            result,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            points: SCAN_REWARD_POINTS,
        };

        let persistence = store.append(item.clone());
        tracing::info!(id = %item.id, item = %item.result.item_name, "scan recorded");
        guard.finish(ScanState::Succeeded { item: item.clone() });

        Ok(ScanOutcome { item, persistence })
    }

    fn ensure_not_classifying(&self) -> Result<()> {
        if matches!(self.state, ScanState::Classifying { .. }) {
            return Err(EcoScanError::ScanInProgress);
        }
        Ok(())
    }
}

/// 分類中の状態を保持する。終了せずにdropされたら中断としてFailedにする
struct ClassifyingGuard<'a> {
    state: &'a mut ScanState,
}

impl<'a> ClassifyingGuard<'a> {
    fn enter(state: &'a mut ScanState, preview: String) -> Self {
        *state = ScanState::Classifying { preview };
        Self { state }
    }

    fn finish(self, next: ScanState) {
        *self.state = next;
    }
}

impl Drop for ClassifyingGuard<'_> {
    fn drop(&mut self) {
        if let ScanState::Classifying { preview } = self.state {
            let preview = std::mem::take(preview);
            tracing::warn!("classification cancelled");
            *self.state = ScanState::Failed {
                preview,
                message: CANCELLED_MESSAGE.to_string(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use async_trait::async_trait;
    use ecoscan_common::{AnalysisResult, Recyclable, WasteCategory};

    struct FixedClassifier(AnalysisResult);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _input: &ImageInput) -> Result<AnalysisResult> {
            Ok(self.0.clone())
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl Classifier for SlowClassifier {
        async fn classify(&self, _input: &ImageInput) -> Result<AnalysisResult> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(EcoScanError::Classification("unreachable".into()))
        }
    }

    fn verdict() -> AnalysisResult {
        AnalysisResult {
            item_name: "Glass Jar".to_string(),
            recyclable: Recyclable::Yes,
            category: WasteCategory::Recyclable,
            recyclability_score: 95.0,
            instructions: "Rinse it".to_string(),
            alternatives: vec![],
            eco_friendly_tip: "Reuse jars for storage".to_string(),
        }
    }

    #[test]
    fn test_state_transitions_without_scan() {
        let mut pipeline = ScanPipeline::new(FixedClassifier(verdict()));
        assert_eq!(pipeline.state(), &ScanState::Idle);

        pipeline.begin_capture().unwrap();
        assert_eq!(pipeline.state().name(), "capturing");

        pipeline.cancel_capture();
        assert_eq!(pipeline.state(), &ScanState::Idle);
    }

    #[tokio::test]
    async fn test_submit_success_sets_state() {
        let mut store = HistoryStore::open(MemoryStore::new());
        let mut pipeline = ScanPipeline::new(FixedClassifier(verdict()));

        let outcome = pipeline
            .submit(&mut store, ImageInput::new("AAAA", "image/jpeg"))
            .await
            .unwrap();

        assert_eq!(outcome.item.points, SCAN_REWARD_POINTS);
        assert_eq!(outcome.persistence, Persistence::Saved);
        assert_eq!(pipeline.state().preview(), Some("data:image/jpeg;base64,AAAA"));
        assert!(pipeline.state().is_terminal());

        pipeline.scan_again().unwrap();
        assert_eq!(pipeline.state(), &ScanState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_timeout() {
        let mut store = HistoryStore::open(MemoryStore::new());
        let mut pipeline = ScanPipeline::new(SlowClassifier).with_timeout(Duration::from_secs(30));

        let err = pipeline
            .submit(&mut store, ImageInput::new("AAAA", "image/jpeg"))
            .await
            .unwrap_err();

        assert!(matches!(err, EcoScanError::ClassificationTimeout(30)));
        assert!(store.is_empty());
        match pipeline.state() {
            ScanState::Failed { preview, message } => {
                assert_eq!(preview, "data:image/jpeg;base64,AAAA");
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    /// 分類中にfutureを破棄しても次のスキャンを受け付ける
    #[tokio::test(start_paused = true)]
    async fn test_cancelled_submit_does_not_wedge() {
        let mut store = HistoryStore::open(MemoryStore::new());
        let mut pipeline = ScanPipeline::new(SlowClassifier);

        let cancelled = tokio::time::timeout(
            Duration::from_secs(1),
            pipeline.submit(&mut store, ImageInput::new("AAAA", "image/jpeg")),
        )
        .await;
        assert!(cancelled.is_err());

        match pipeline.state() {
            ScanState::Failed { preview, message } => {
                assert_eq!(preview, "data:image/jpeg;base64,AAAA");
                assert_eq!(message, CANCELLED_MESSAGE);
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert!(store.is_empty());
        pipeline.scan_again().unwrap();
        pipeline.begin_capture().unwrap();
    }

    #[tokio::test]
    async fn test_rejects_input_while_classifying() {
        let mut store = HistoryStore::open(MemoryStore::new());
        let mut pipeline = ScanPipeline::new(FixedClassifier(verdict()));

        // 分類中のまま中断された状態を再現
        pipeline.state = ScanState::Classifying {
            preview: "data:image/jpeg;base64,AAAA".to_string(),
        };

        let err = pipeline
            .submit(&mut store, ImageInput::new("BBBB", "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, EcoScanError::ScanInProgress));
        assert!(matches!(pipeline.begin_capture(), Err(EcoScanError::ScanInProgress)));
        assert!(store.is_empty());
    }
}
