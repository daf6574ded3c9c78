use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 分類APIの呼び出し先
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// 中継サーバ経由（APIキーはサーバ側）
    #[default]
    Relay,
    /// Gemini APIを直接呼び出す
    Gemini,
}

impl AiProvider {
    pub fn name(&self) -> &'static str {
        match self {
            AiProvider::Relay => "relay",
            AiProvider::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
