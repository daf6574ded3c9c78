//! 分類APIクライアント
//!
//! - RelayClient: 中継サーバ経由（APIキーはサーバ側に置く）
//! - GeminiClient: Gemini APIを直接呼び出す（中継サーバ自身が使う）
//!
//! どちらも1リクエスト・リトライなし。失敗はすべて分類失敗として返す。

mod gemini;
mod relay;

pub use gemini::GeminiClient;
pub use relay::RelayClient;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use ecoscan_common::{AnalysisResult, ImageInput};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, input: &ImageInput) -> Result<AnalysisResult>;
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    async fn classify(&self, input: &ImageInput) -> Result<AnalysisResult> {
        (**self).classify(input).await
    }
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Box<C> {
    async fn classify(&self, input: &ImageInput) -> Result<AnalysisResult> {
        (**self).classify(input).await
    }
}

/// 設定からクライアントを生成
pub fn build_classifier(config: &Config, provider: AiProvider) -> Result<Box<dyn Classifier>> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    match provider {
        AiProvider::Relay => Ok(Box::new(RelayClient::new(&config.endpoint, timeout)?)),
        AiProvider::Gemini => Ok(Box::new(GeminiClient::from_config(config)?)),
    }
}
