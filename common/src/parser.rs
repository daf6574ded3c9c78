//! APIレスポンスパーサー
//!
//! 分類APIのレスポンス本文全体をAnalysisResultとして厳密に検証する。
//! 前後のテキストやコードフェンスは受け付けない。

use crate::error::{Error, Result};
use crate::types::AnalysisResult;

/// 判定結果レスポンスをパース
///
/// 7フィールドすべて必須、列挙値は宣言された値のみ、
/// スコアは0〜100の有限値。いずれかに違反すればエラー。
///
/// # Examples
/// ```
/// use ecoscan_common::parse_analysis_response;
///
/// let body = r#"{"itemName":"Can","recyclable":"Yes","category":"Recyclable",
///     "recyclabilityScore":88,"instructions":"Rinse","alternatives":[],
///     "ecoFriendlyTip":"Crush it"}"#;
/// assert_eq!(parse_analysis_response(body).unwrap().item_name, "Can");
/// assert!(parse_analysis_response(&format!("OK {}", body)).is_err());
/// ```
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    let result: AnalysisResult = serde_json::from_str(response)
        .map_err(|e| Error::Parse(format!("AnalysisResult: {}", e)))?;
    validate_analysis(&result)?;
    Ok(result)
}

/// スキーマで表現できない制約の検証
pub fn validate_analysis(result: &AnalysisResult) -> Result<()> {
    let score = result.recyclability_score;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(Error::Validation(format!(
            "recyclabilityScore must be within 0-100, got {}",
            score
        )));
    }
    if result.item_name.trim().is_empty() {
        return Err(Error::Validation("itemName is empty".into()));
    }
    Ok(())
}
