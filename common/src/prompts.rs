//! プロンプト・出力スキーマ生成モジュール
//!
//! CLIと中継サーバで共有:
//! - ANALYSIS_PROMPT: 判定指示文
//! - build_response_schema: 構造化出力スキーマ（Gemini responseSchema形式）

use crate::types::{Recyclable, WasteCategory};
use serde_json::{json, Value};

/// 判定指示文
pub const ANALYSIS_PROMPT: &str = "Analyze the object in this image. Identify the item, determine if it's recyclable, \
and classify its category (Recyclable, Organic, Hazardous, or General Waste). \
Provide a recyclability score from 0 to 100. Give instructions for disposal, suggest eco-friendly alternatives, \
and offer a relevant eco-tip. Respond in JSON format according to the provided schema.";

/// 判定結果の必須フィールド（スキーマの並び順）
pub const REQUIRED_FIELDS: &[&str] = &[
    "itemName",
    "recyclable",
    "category",
    "recyclabilityScore",
    "instructions",
    "alternatives",
    "ecoFriendlyTip",
];

/// 構造化出力スキーマを生成
///
/// 全フィールド必須、列挙型は宣言値のみに制約する
pub fn build_response_schema() -> Value {
    let recyclable: Vec<&str> = Recyclable::ALL.iter().map(|r| r.as_str()).collect();
    let categories: Vec<&str> = WasteCategory::ALL.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "itemName": {
                "type": "STRING",
                "description": "The name of the item identified in the image."
            },
            "recyclable": {
                "type": "STRING",
                "enum": recyclable,
                "description": "Whether the item is recyclable."
            },
            "category": {
                "type": "STRING",
                "enum": categories,
                "description": "Classify the item into one of the categories: Recyclable, Organic, Hazardous, or General Waste."
            },
            "recyclabilityScore": {
                "type": "NUMBER",
                "description": "A score from 0 to 100 indicating how recyclable the item is. Higher is better."
            },
            "instructions": {
                "type": "STRING",
                "description": "Detailed recycling instructions if applicable, or proper disposal instructions if not."
            },
            "alternatives": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of eco-friendly alternatives to the item."
            },
            "ecoFriendlyTip": {
                "type": "STRING",
                "description": "A relevant eco-friendly tip related to the item or its category."
            }
        },
        "required": REQUIRED_FIELDS,
        "propertyOrdering": REQUIRED_FIELDS
    })
}
