use super::Classifier;
use crate::error::{EcoScanError, Result};
use async_trait::async_trait;
use ecoscan_common::{parse_analysis_response, AnalysisResult, ClassifyRequest, ErrorBody, ImageInput};
use std::time::Duration;

/// 中継サーバの判定エンドポイントを呼ぶクライアント
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EcoScanError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// 非2xxレスポンスのメッセージ（`{error}` があれば優先）
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.is_empty() => match parsed.message {
            Some(message) if !message.is_empty() => format!("{}: {}", parsed.error, message),
            _ => parsed.error,
        },
        _ => format!("API error: {}", status.as_u16()),
    }
}

#[async_trait]
impl Classifier for RelayClient {
    async fn classify(&self, input: &ImageInput) -> Result<AnalysisResult> {
        tracing::debug!(endpoint = %self.endpoint, mime_type = %input.mime_type, "sending classification request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest::from(input))
            .send()
            .await
            .map_err(|e| {
                EcoScanError::Classification(format!(
                    "Failed to analyze image. Please check your connection. ({})",
                    e
                ))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            EcoScanError::Classification(format!("Failed to read classification response: {}", e))
        })?;

        if !status.is_success() {
            tracing::warn!(%status, "classification request failed");
            return Err(EcoScanError::Classification(error_message(status, &body)));
        }

        parse_analysis_response(&body).map_err(|e| {
            EcoScanError::Classification(format!("Invalid classification response: {}", e))
        })
    }
}
