//! Gemini API連携
//!
//! 画像（inline_data）+ 指示文 + responseSchema を1回で送信し、
//! 返ってきたテキストを厳密にパースする。

use super::Classifier;
use crate::config::Config;
use crate::error::{EcoScanError, Result};
use async_trait::async_trait;
use ecoscan_common::{build_response_schema, parse_analysis_response, AnalysisResult, ImageInput, ANALYSIS_PROMPT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EcoScanError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_key()?,
            &config.gemini_base_url,
            &config.model,
            config.temperature,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, input: &ImageInput) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: input.mime_type.clone(),
                            data: input.data.clone(),
                        },
                    },
                    Part::Text {
                        text: ANALYSIS_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: build_response_schema(),
            },
        }
    }
}

/// レスポンスから最初の候補テキストを取り出す
fn extract_text(response: GeminiResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
}

#[async_trait]
impl Classifier for GeminiClient {
    async fn classify(&self, input: &ImageInput) -> Result<AnalysisResult> {
        tracing::debug!(model = %self.model, mime_type = %input.mime_type, "calling Gemini API");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(input))
            .send()
            .await
            .map_err(|e| EcoScanError::Classification(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Gemini API returned an error");
            return Err(EcoScanError::Classification(format!(
                "Gemini API error ({}): {}",
                status.as_u16(),
                text.chars().take(300).collect::<String>()
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EcoScanError::Classification(format!("Invalid Gemini response: {}", e)))?;

        let text = extract_text(payload)
            .ok_or_else(|| EcoScanError::Classification("Empty response from Gemini".into()))?;

        parse_analysis_response(&text).map_err(|e| {
            EcoScanError::Classification(format!("Invalid classification response: {}", e))
        })
    }
}
