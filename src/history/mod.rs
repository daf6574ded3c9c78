//! スキャン履歴ストア
//!
//! 新しい順・ID重複なし・最大50件。変更のたびに同期的に永続化する。
//! 永続化に失敗してもメモリ上の履歴を正とし、警告だけ返す。

mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore};

use crate::error::EcoScanError;
use chrono::{DateTime, SecondsFormat, Utc};
use ecoscan_common::HistoryItem;
use std::collections::HashSet;
use std::path::Path;

/// 永続化キー
pub const HISTORY_KEY: &str = "scanHistory";
/// 最大保持件数
pub const HISTORY_CAPACITY: usize = 50;

/// append後の永続化状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Saved,
    /// 保存失敗（メモリ上には反映済み）
    Degraded(String),
}

pub struct HistoryStore {
    storage: Box<dyn KeyValueStore>,
    items: Vec<HistoryItem>,
    persist_error: Option<String>,
}

impl HistoryStore {
    /// ストレージから読み込んで開く
    ///
    /// 読めない・壊れている場合は空の履歴で開始する
    pub fn open(storage: impl KeyValueStore + 'static) -> Self {
        let items = match storage.get(HISTORY_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<HistoryItem>>(&json) {
                Ok(items) => normalize(items),
                Err(e) => {
                    tracing::warn!("履歴が破損しているため空で開始します: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("履歴を読み込めません: {}", e);
                Vec::new()
            }
        };
        tracing::debug!(count = items.len(), "history loaded");

        Self {
            storage: Box::new(storage),
            items,
            persist_error: None,
        }
    }

    /// ディレクトリ配下のファイルストアで開く
    pub fn open_dir(dir: &Path) -> Self {
        Self::open(FileStore::new(dir))
    }

    /// 先頭に追加し、同じIDの既存項目を除き、50件に切り詰めて保存
    pub fn append(&mut self, item: HistoryItem) -> Persistence {
        let id = item.id.clone();
        self.items.retain(|existing| existing.id != id);
        self.items.insert(0, item);
        self.items.truncate(HISTORY_CAPACITY);
        self.persist()
    }

    pub fn list(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 直近の永続化エラー（成功すればクリア）
    pub fn last_persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    fn persist(&mut self) -> Persistence {
        let result = serde_json::to_string(&self.items)
            .map_err(EcoScanError::from)
            .and_then(|json| self.storage.set(HISTORY_KEY, &json));

        match result {
            Ok(()) => {
                self.persist_error = None;
                Persistence::Saved
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("履歴を保存できませんでした（このセッション中はメモリ上で保持）: {}", message);
                self.persist_error = Some(message.clone());
                Persistence::Degraded(message)
            }
        }
    }
}

/// 読み込んだ履歴の不変条件を回復（ID重複は先勝ち、50件まで）
fn normalize(items: Vec<HistoryItem>) -> Vec<HistoryItem> {
    let mut seen = HashSet::new();
    let mut items: Vec<HistoryItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();
    items.truncate(HISTORY_CAPACITY);
    items
}

/// 履歴IDを生成（タイムスタンプ + ランダム値）
pub fn new_history_id(now: DateTime<Utc>) -> String {
    format!(
        "{}-{:016x}",
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
        rand::random::<u64>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_id_format() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = new_history_id(now);
        assert!(id.starts_with("2026-03-01T12:00:00.000Z-"));
        assert_eq!(id.len(), "2026-03-01T12:00:00.000Z-".len() + 16);
    }

    #[test]
    fn test_history_ids_differ() {
        let now = Utc::now();
        assert_ne!(new_history_id(now), new_history_id(now));
    }
}
