//! 履歴ストアの結合テスト
//!
//! 件数上限・ID重複・永続化・破損データ・保存失敗を検証

use ecoscan::history::{
    FileStore, HistoryStore, MemoryStore, Persistence, HISTORY_CAPACITY, HISTORY_KEY,
};
use ecoscan_common::{AnalysisResult, HistoryItem, Recyclable, WasteCategory};
use tempfile::tempdir;

fn item(id: &str, name: &str) -> HistoryItem {
    HistoryItem {
        id: id.to_string(),
        image: "data:image/jpeg;base64,AAAA".to_string(),
        result: AnalysisResult {
            item_name: name.to_string(),
            recyclable: Recyclable::Yes,
            category: WasteCategory::Recyclable,
            recyclability_score: 80.0,
            instructions: "Rinse".to_string(),
            alternatives: vec![],
            eco_friendly_tip: "Reuse".to_string(),
        },
        timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        points: 10,
    }
}

fn ids(store: &HistoryStore) -> Vec<&str> {
    store.list().iter().map(|i| i.id.as_str()).collect()
}

#[test]
fn test_append_is_newest_first() {
    let mut store = HistoryStore::open(MemoryStore::new());
    store.append(item("a", "A"));
    store.append(item("b", "B"));
    store.append(item("c", "C"));

    assert_eq!(ids(&store), vec!["c", "b", "a"]);
}

/// 51件目で最古の1件が消える
#[test]
fn test_capacity_evicts_oldest() {
    let mut store = HistoryStore::open(MemoryStore::new());
    for n in 0..HISTORY_CAPACITY {
        store.append(item(&format!("id-{}", n), "x"));
    }
    assert_eq!(store.len(), HISTORY_CAPACITY);

    store.append(item("newest", "x"));

    assert_eq!(store.len(), HISTORY_CAPACITY);
    assert_eq!(store.list()[0].id, "newest");
    assert!(store.list().iter().all(|i| i.id != "id-0"));
    assert_eq!(store.list().last().unwrap().id, "id-1");
}

/// 同じIDは置き換え（先頭に移動）
#[test]
fn test_same_id_replaces_existing() {
    let mut store = HistoryStore::open(MemoryStore::new());
    store.append(item("a", "first"));
    store.append(item("b", "other"));
    store.append(item("a", "second"));

    assert_eq!(ids(&store), vec!["a", "b"]);
    assert_eq!(store.list()[0].result.item_name, "second");
}

/// list は何度呼んでも同じ
#[test]
fn test_list_is_idempotent() {
    let mut store = HistoryStore::open(MemoryStore::new());
    store.append(item("a", "A"));

    let first = store.list().to_vec();
    let second = store.list().to_vec();
    assert_eq!(first, second);
}

#[test]
fn test_persists_across_reopen() {
    let dir = tempdir().expect("Failed to create temp dir");

    {
        let mut store = HistoryStore::open_dir(dir.path());
        assert_eq!(store.append(item("a", "A")), Persistence::Saved);
        assert_eq!(store.append(item("b", "B")), Persistence::Saved);
    }

    let reopened = HistoryStore::open_dir(dir.path());
    assert_eq!(ids(&reopened), vec!["b", "a"]);

    // 保存形式はHistoryItemのJSON配列
    let raw = std::fs::read_to_string(FileStore::new(dir.path()).path_for(HISTORY_KEY)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["result"]["itemName"], "B");
    assert_eq!(value[0]["points"], 10);
}

/// 破損した保存データは空の履歴として扱う
#[test]
fn test_corrupt_storage_starts_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = FileStore::new(dir.path()).path_for(HISTORY_KEY);
    std::fs::write(&path, "{ not json").unwrap();

    let mut store = HistoryStore::open_dir(dir.path());
    assert!(store.is_empty());

    // 次の保存で上書きされる
    assert_eq!(store.append(item("a", "A")), Persistence::Saved);
    assert_eq!(ids(&HistoryStore::open_dir(dir.path())), vec!["a"]);
}

/// 読み込み時に上限超過・ID重複を正規化する
#[test]
fn test_loaded_history_is_normalized() {
    let mut items: Vec<HistoryItem> = (0..60).map(|n| item(&format!("id-{}", n), "x")).collect();
    items.insert(1, item("id-0", "duplicate"));
    let json = serde_json::to_string(&items).unwrap();

    let store = HistoryStore::open(MemoryStore::with_entry(HISTORY_KEY, &json));

    assert_eq!(store.len(), HISTORY_CAPACITY);
    assert_eq!(store.list()[0].id, "id-0");
    assert_eq!(store.list()[0].result.item_name, "x");
    assert_eq!(store.list()[1].id, "id-1");
}

/// 保存に失敗してもメモリ上の履歴は更新される
#[test]
fn test_write_failure_is_degraded() {
    let mut store = HistoryStore::open(MemoryStore::read_only());

    let persistence = store.append(item("a", "A"));

    assert!(matches!(persistence, Persistence::Degraded(_)));
    assert_eq!(ids(&store), vec!["a"]);
    assert!(store.last_persist_error().is_some());
}
