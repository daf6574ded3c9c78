//! 画面表示（ターミナル出力）
//!
//! 各画面は履歴ストアの射影。状態は持たない。

use crate::error::{EcoScanError, Result};
use chrono::DateTime;
use ecoscan_common::{
    AnalysisResult, Coordinates, HistoryItem, ImageInput, ProfileStats, RankedCenter,
    Recyclable, TipCursor,
};
use std::fmt::Write;

/// 画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Welcome,
    Scanner,
    History,
    Map,
    Profile,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Welcome => "Welcome",
            View::Scanner => "Scanner",
            View::History => "History",
            View::Map => "Map",
            View::Profile => "Profile",
        }
    }

    /// ナビゲーションに出す画面か（オンボーディング以外）
    pub fn in_navigation(&self) -> bool {
        !matches!(self, View::Welcome)
    }
}

pub fn render_header(view: View) -> String {
    format!("━━ {} ━━\n", view.title())
}

pub fn render_welcome() -> String {
    "Welcome to EcoScan\n\n\
     Snap a photo of any item, and we'll tell you if it's recyclable and how to dispose of it responsibly.\n"
        .to_string()
}

fn verdict_label(recyclable: Recyclable) -> &'static str {
    match recyclable {
        Recyclable::Yes => "Recyclable",
        Recyclable::No => "Not Recyclable",
        Recyclable::Uncertain => "Recyclability Uncertain",
    }
}

fn score_label(score: f64) -> &'static str {
    if score > 75.0 {
        "good"
    } else if score > 40.0 {
        "fair"
    } else {
        "poor"
    }
}

fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 100.0) / 5.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}

/// Data URIを「MIME・サイズ」の一行にする
pub fn describe_preview(data_uri: &str) -> String {
    match ImageInput::from_data_uri(data_uri) {
        Some(input) => {
            // Base64 4文字 = 3バイト
            let bytes = input.data.trim_end_matches('=').len() * 3 / 4;
            format!("{} ({:.1} KB)", input.mime_type, bytes as f64 / 1024.0)
        }
        None => "unknown image".to_string(),
    }
}

fn format_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// 判定結果（画像と紐付けて表示）
pub fn render_result(result: &AnalysisResult, image: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image: {}", describe_preview(image));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", result.item_name);
    let _ = writeln!(out, "{} · {}", verdict_label(result.recyclable), result.category);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Recyclability Score: {}/100 ({}) {}",
        result.recyclability_score,
        score_label(result.recyclability_score),
        score_bar(result.recyclability_score)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Instructions:\n  {}", result.instructions);
    if !result.alternatives.is_empty() {
        let _ = writeln!(out, "Eco-Friendly Alternatives:");
        for alt in &result.alternatives {
            let _ = writeln!(out, "  • {}", alt);
        }
    }
    let _ = writeln!(out, "Eco Tip:\n  \"{}\"", result.eco_friendly_tip);
    out
}

/// 分類失敗（撮影画像は残して表示）
pub fn render_failure(preview: &str, message: &str) -> String {
    format!("Image: {}\nError! {}\n", describe_preview(preview), message)
}

pub fn render_history(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "Your scanning history is empty.\nScanned items will appear here.\n".to_string();
    }

    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{}  {} · {} · {} · score {} · +{} pts",
            format_timestamp(&item.timestamp),
            item.result.item_name,
            verdict_label(item.result.recyclable),
            item.result.category,
            item.result.recyclability_score,
            item.points
        );
    }
    out
}

pub fn render_profile(stats: &ProfileStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Your Eco Stats");
    let _ = writeln!(out, "  Total Items Scanned: {}", stats.total_scans);
    let _ = writeln!(out, "  Total Eco Points:    {}", stats.total_points);
    let _ = writeln!(out, "  Average Score:       {}", stats.avg_confidence);

    if !stats.category_counts.is_empty() {
        let _ = writeln!(out, "\nCategories");
        for (category, count) in &stats.category_counts {
            let _ = writeln!(out, "  {:<14} {}", category.as_str(), count);
        }
    }

    let _ = writeln!(out, "\nAchievements");
    for (achievement, unlocked) in stats.achievements() {
        let _ = writeln!(
            out,
            "  [{}] {} - {}",
            if unlocked { "x" } else { " " },
            achievement.title(),
            achievement.description()
        );
    }
    out
}

pub fn render_map(user: Coordinates, ranked: &[RankedCenter]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Your Current Location");
    let _ = writeln!(out, "  Latitude:  {:.4}", user.lat);
    let _ = writeln!(out, "  Longitude: {:.4}", user.lng);
    let _ = writeln!(out, "\nNearby Recycling Centers");

    if ranked.is_empty() {
        let _ = writeln!(out, "  Could not find any recycling centers.");
        return out;
    }

    for (i, entry) in ranked.iter().enumerate() {
        let marker = if i == 0 { "▶" } else { " " };
        let _ = writeln!(
            out,
            "{} {} ({:.2} km away)\n    {}",
            marker, entry.center.name, entry.distance, entry.center.address
        );
    }
    out
}

/// 表示位置を決める（明示指定 → 既定位置）
///
/// どちらも無い・範囲外ならエラー。この場合センターの並べ替えはしない
pub fn locate(explicit: Option<Coordinates>, home: Option<Coordinates>) -> Result<Coordinates> {
    let location = explicit.or(home).ok_or_else(|| {
        EcoScanError::Location(
            "no location given. Pass --lat/--lng or run `ecoscan config --set-location LAT,LNG`".into(),
        )
    })?;
    if !location.is_valid() {
        return Err(EcoScanError::Location(format!(
            "coordinates out of range ({}, {})",
            location.lat, location.lng
        )));
    }
    Ok(location)
}

pub fn render_location_error(message: &str) -> String {
    format!("Location Error! {}\n", message)
}

pub fn render_tip(cursor: TipCursor) -> String {
    format!("Eco Tip of the Day: {}\n", cursor.current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoscan_common::{rank_centers, WasteCategory, RECYCLING_CENTERS};

    fn result() -> AnalysisResult {
        AnalysisResult {
            item_name: "Plastic Bottle".to_string(),
            recyclable: Recyclable::Yes,
            category: WasteCategory::Recyclable,
            recyclability_score: 92.0,
            instructions: "Rinse and recycle.".to_string(),
            alternatives: vec!["Steel bottle".to_string()],
            eco_friendly_tip: "Refill instead of buying.".to_string(),
        }
    }

    #[test]
    fn test_views_are_exhaustive() {
        let views = [View::Welcome, View::Scanner, View::History, View::Map, View::Profile];
        let titles: Vec<&str> = views.iter().map(|v| v.title()).collect();
        assert_eq!(titles, vec!["Welcome", "Scanner", "History", "Map", "Profile"]);
        assert_eq!(views.iter().filter(|v| v.in_navigation()).count(), 4);
    }

    #[test]
    fn test_render_result() {
        let text = render_result(&result(), "data:image/jpeg;base64,AAAA");
        assert!(text.contains("Plastic Bottle"));
        assert!(text.contains("Recyclable · Recyclable"));
        assert!(text.contains("92/100 (good)"));
        assert!(text.contains("• Steel bottle"));
        assert!(text.contains("image/jpeg"));
    }

    #[test]
    fn test_render_failure_keeps_image() {
        let text = render_failure("data:image/png;base64,AAAA", "API error: 500");
        assert!(text.contains("image/png"));
        assert!(text.contains("API error: 500"));
    }

    #[test]
    fn test_render_empty_history() {
        assert!(render_history(&[]).contains("history is empty"));
    }

    #[test]
    fn test_render_history_lists_items() {
        let item = HistoryItem {
            id: "1".to_string(),
            image: "data:image/jpeg;base64,AAAA".to_string(),
            result: result(),
            timestamp: "2026-02-03T04:05:06.000Z".to_string(),
            points: 10,
        };
        let text = render_history(&[item]);
        assert!(text.contains("2026-02-03 04:05"));
        assert!(text.contains("Plastic Bottle"));
        assert!(text.contains("+10 pts"));
    }

    #[test]
    fn test_render_profile_empty() {
        let text = render_profile(&ProfileStats::from_history(&[]));
        assert!(text.contains("Total Items Scanned: 0"));
        assert!(text.contains("[ ] First Scan"));
    }

    #[test]
    fn test_render_map_marks_nearest() {
        let user = Coordinates::new(13.0827, 80.2707);
        let text = render_map(user, &rank_centers(user, RECYCLING_CENTERS));
        assert!(text.contains("▶ Eco-Friendly Recyclers (0.00 km away)"));
        assert!(text.contains("Latitude:  13.0827"));
    }

    #[test]
    fn test_render_map_empty() {
        let text = render_map(Coordinates::new(0.0, 0.0), &[]);
        assert!(text.contains("Could not find any recycling centers."));
    }

    #[test]
    fn test_locate_prefers_explicit() {
        let explicit = Coordinates::new(1.0, 2.0);
        let home = Coordinates::new(3.0, 4.0);
        assert_eq!(locate(Some(explicit), Some(home)).unwrap(), explicit);
        assert_eq!(locate(None, Some(home)).unwrap(), home);
    }

    #[test]
    fn test_locate_errors() {
        assert!(matches!(locate(None, None), Err(EcoScanError::Location(_))));
        let err = locate(Some(Coordinates::new(91.0, 0.0)), None).unwrap_err();
        assert!(err.to_string().starts_with("Unable to retrieve your location"));
    }

    #[test]
    fn test_describe_preview() {
        // 8文字 → 6バイト
        assert_eq!(describe_preview("data:image/png;base64,AAAAAAAA"), "image/png (0.0 KB)");
        assert_eq!(describe_preview("garbage"), "unknown image");
    }

    #[test]
    fn test_score_bar_bounds() {
        assert_eq!(score_bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(score_bar(100.0), format!("[{}]", "#".repeat(20)));
    }
}
