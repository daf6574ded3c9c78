//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use ecoscan::capture;
use ecoscan::error::EcoScanError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像を読み込んだ場合
#[test]
fn test_load_nonexistent_image() {
    let result = capture::image_input_from_file(Path::new("/nonexistent/path/12345.jpg"));
    assert!(matches!(result, Err(EcoScanError::FileNotFound(_))));
}

/// 画像以外の拡張子
#[test]
fn test_load_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let result = capture::image_input_from_file(&path);
    assert!(matches!(result, Err(EcoScanError::ImageDecode(_))));
}

/// 拡張子は画像だが中身が壊れている場合
#[test]
fn test_load_corrupt_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();

    let result = capture::image_input_from_file(&path);
    assert!(matches!(result, Err(EcoScanError::ImageDecode(_))));
}

/// EcoScanErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        EcoScanError::Config("テスト設定エラー".to_string()),
        EcoScanError::FileNotFound("test.jpg".to_string()),
        EcoScanError::CameraUnavailable("no device".to_string()),
        EcoScanError::Classification("API error: 500".to_string()),
        EcoScanError::ClassificationTimeout(30),
        EcoScanError::ScanInProgress,
        EcoScanError::Location("denied".to_string()),
        EcoScanError::Storage("quota exceeded".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = EcoScanError::MissingApiKey.to_string();

    assert!(display.contains("APIキー"));
    assert!(display.contains("ecoscan config"));
}

/// 分類失敗はメッセージをそのまま表示する
#[test]
fn test_classification_message_verbatim() {
    let err = EcoScanError::Classification("Failed to analyze image: quota".to_string());
    assert_eq!(err.to_string(), "Failed to analyze image: quota");
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: EcoScanError = io_err.into();

    assert!(matches!(err, EcoScanError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: EcoScanError = json_err.into();

    assert!(matches!(err, EcoScanError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_transparent() {
    let common_err = ecoscan_common::Error::Validation("recyclabilityScore out of range".to_string());
    let err: EcoScanError = common_err.into();

    assert!(matches!(err, EcoScanError::Common(_)));
    assert_eq!(err.to_string(), "Validation error: recyclabilityScore out of range");
}
