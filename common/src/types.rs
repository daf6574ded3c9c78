//! 判定結果・履歴の型定義
//!
//! CLIと中継サーバで共有される型:
//! - AnalysisResult: 分類APIの判定結果
//! - HistoryItem: 履歴に保存される1スキャン分
//! - ImageInput: 分類APIに渡す画像ペイロード

use serde::{Deserialize, Serialize};
use std::fmt;

/// リサイクル可否
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recyclable {
    Yes,
    No,
    Uncertain,
}

impl Recyclable {
    pub const ALL: [Recyclable; 3] = [Recyclable::Yes, Recyclable::No, Recyclable::Uncertain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recyclable::Yes => "Yes",
            Recyclable::No => "No",
            Recyclable::Uncertain => "Uncertain",
        }
    }
}

impl fmt::Display for Recyclable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 廃棄区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WasteCategory {
    Recyclable,
    Organic,
    Hazardous,
    #[serde(rename = "General Waste")]
    GeneralWaste,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 4] = [
        WasteCategory::Recyclable,
        WasteCategory::Organic,
        WasteCategory::Hazardous,
        WasteCategory::GeneralWaste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Recyclable => "Recyclable",
            WasteCategory::Organic => "Organic",
            WasteCategory::Hazardous => "Hazardous",
            WasteCategory::GeneralWaste => "General Waste",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分類APIの判定結果
///
/// 全フィールド必須。未知のフィールドは拒否する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisResult {
    pub item_name: String,
    pub recyclable: Recyclable,
    pub category: WasteCategory,
    /// 0〜100
    pub recyclability_score: f64,
    pub instructions: String,
    pub alternatives: Vec<String>,
    pub eco_friendly_tip: String,
}

/// 履歴1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    /// data URI形式の画像
    pub image: String,
    pub result: AnalysisResult,
    /// RFC 3339
    pub timestamp: String,
    pub points: u32,
}

/// 分類APIへの入力画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Base64エンコード済みペイロード
    pub data: String,
    pub mime_type: String,
}

impl ImageInput {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// `data:<mime>;base64,<payload>` 形式に変換
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Data URIから復元
    ///
    /// base64形式でないData URIはNone
    pub fn from_data_uri(data_uri: &str) -> Option<Self> {
        let rest = data_uri.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() || payload.is_empty() {
            return None;
        }
        Some(Self::new(payload, mime_type))
    }
}

/// 中継サーバへのリクエストボディ
///
/// 欠落フィールドは空文字として受け取り、サーバ側で400を返す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifyRequest {
    pub base64_image_data: String,
    pub mime_type: String,
}

impl From<&ImageInput> for ClassifyRequest {
    fn from(input: &ImageInput) -> Self {
        Self {
            base64_image_data: input.data.clone(),
            mime_type: input.mime_type.clone(),
        }
    }
}

/// 中継サーバのエラーボディ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 緯度経度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// 緯度[-90, 90]・経度[-180, 180]の範囲内か
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// リサイクルセンター（固定の参照データ）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecyclingCenter {
    pub id: u32,
    pub name: &'static str,
    pub address: &'static str,
    pub coordinates: Coordinates,
}

/// 距離付きのリサイクルセンター
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedCenter {
    pub center: RecyclingCenter,
    /// km
    pub distance: f64,
}
