use crate::ai_provider::AiProvider;
use crate::capture::MAX_CAPTURE_DIMENSION;
use crate::error::{EcoScanError, Result};
use ecoscan_common::Coordinates;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/analyze-image";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub provider: AiProvider,
    /// 中継サーバの判定エンドポイント
    pub endpoint: String,
    pub model: String,
    pub gemini_base_url: String,
    pub temperature: f32,
    /// カメラ画像の長辺上限(px)
    pub max_image_size: u32,
    pub jpeg_quality: u8,
    pub timeout_seconds: u64,
    /// 位置情報が取れない端末向けの既定位置
    pub home_location: Option<Coordinates>,
    /// 履歴の保存先（未指定ならOS標準のデータディレクトリ）
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: AiProvider::Relay,
            endpoint: DEFAULT_ENDPOINT.into(),
            model: "gemini-2.5-flash".into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            temperature: 0.2,
            max_image_size: MAX_CAPTURE_DIMENSION,
            jpeg_quality: 90,
            timeout_seconds: 30,
            home_location: None,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EcoScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("ecoscan").join("config.json"))
    }

    /// 環境変数で上書き（.envも読み込み済みの前提）
    fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("ECOSCAN_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint;
            }
        }
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(EcoScanError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| EcoScanError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("ecoscan"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_image_size == 0 || self.max_image_size > MAX_CAPTURE_DIMENSION {
            return Err(EcoScanError::Config(format!(
                "max_image_size must be within 1-{}",
                MAX_CAPTURE_DIMENSION
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(EcoScanError::Config("jpeg_quality must be within 1-100".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(EcoScanError::Config("timeout_seconds must be positive".into()));
        }
        if let Some(location) = self.home_location {
            if !location.is_valid() {
                return Err(EcoScanError::Config("home_location is out of range".into()));
            }
        }
        Ok(())
    }
}
