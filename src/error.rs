use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcoScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。GEMINI_API_KEY を設定するか `ecoscan config --set-api-key YOUR_KEY` を実行してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("Could not access the camera. Please check permissions and ensure another app isn't using it. ({0})")]
    CameraUnavailable(String),

    #[error("画像を読み込めません: {0}")]
    ImageDecode(String),

    #[error("画像エンコードエラー: {0}")]
    ImageEncode(String),

    #[error("{0}")]
    Classification(String),

    #[error("Classification timed out after {0}s")]
    ClassificationTimeout(u64),

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Unable to retrieve your location: {0}")]
    Location(String),

    #[error("ストレージエラー: {0}")]
    Storage(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("サーバエラー: {0}")]
    Server(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] ecoscan_common::Error),
}

pub type Result<T> = std::result::Result<T, EcoScanError>;
