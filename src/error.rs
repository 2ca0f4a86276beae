use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlantCareError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`plant-care config --set-plant-id-key KEY --set-perenual-key KEY` で設定してください")]
    MissingApiKey,

    #[error("画像が選択されていません")]
    NoImageSelected,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("{service} HTTP {status}")]
    Service { service: &'static str, status: u16 },

    #[error("通信エラー: {0}")]
    Network(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] plant_care_common::Error),
}

impl From<reqwest::Error> for PlantCareError {
    fn from(e: reqwest::Error) -> Self {
        // URLにはクエリのAPIキーが含まれる
        PlantCareError::Network(e.without_url().to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlantCareError>;
