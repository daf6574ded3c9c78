//! プロフィール統計（履歴からの集計）
//!
//! 履歴の射影のみ。状態は持たず、表示のたびに再計算する。

use crate::types::{HistoryItem, WasteCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// 実績
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Achievement {
    /// 初スキャン
    FirstScan,
    /// 10回以上スキャン
    EcoWarrior,
    /// 累計1000ポイント以上
    PointCollector,
    /// スコア100の判定が1件以上
    PerfectScore,
}

impl Achievement {
    pub const ALL: [Achievement; 4] = [
        Achievement::FirstScan,
        Achievement::EcoWarrior,
        Achievement::PointCollector,
        Achievement::PerfectScore,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstScan => "First Scan",
            Achievement::EcoWarrior => "Eco Warrior",
            Achievement::PointCollector => "Point Collector",
            Achievement::PerfectScore => "Perfect Score",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstScan => "Scan your first item",
            Achievement::EcoWarrior => "Scan 10 items",
            Achievement::PointCollector => "Earn 1000 eco points",
            Achievement::PerfectScore => "Find an item with a recyclability score of 100",
        }
    }
}

/// 集計結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub total_scans: usize,
    pub total_points: u64,
    /// スコア平均（四捨五入）。履歴が空なら0
    pub avg_confidence: u32,
    pub category_counts: BTreeMap<WasteCategory, usize>,
    pub has_perfect_score: bool,
}

impl ProfileStats {
    pub fn from_history(history: &[HistoryItem]) -> Self {
        let total_scans = history.len();
        let total_points = history.iter().map(|h| h.points as u64).sum();

        let avg_confidence = if total_scans == 0 {
            0
        } else {
            let sum: f64 = history.iter().map(|h| h.result.recyclability_score).sum();
            (sum / total_scans as f64).round() as u32
        };

        let mut category_counts = BTreeMap::new();
        for item in history {
            *category_counts.entry(item.result.category).or_insert(0) += 1;
        }

        let has_perfect_score = history
            .iter()
            .any(|h| h.result.recyclability_score == 100.0);

        Self {
            total_scans,
            total_points,
            avg_confidence,
            category_counts,
            has_perfect_score,
        }
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        match achievement {
            Achievement::FirstScan => self.total_scans >= 1,
            Achievement::EcoWarrior => self.total_scans >= 10,
            Achievement::PointCollector => self.total_points >= 1000,
            Achievement::PerfectScore => self.has_perfect_score,
        }
    }

    /// 全実績と解除状態
    pub fn achievements(&self) -> Vec<(Achievement, bool)> {
        Achievement::ALL
            .iter()
            .map(|&a| (a, self.is_unlocked(a)))
            .collect()
    }

    pub fn category_count(&self, category: WasteCategory) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }
}
