//! 外部サービス連携
//!
//! - plant_id: 画像から植物を識別（Plant.id v3）
//! - perenual: 学名から育て方を取得（Perenual）
//! - wikipedia: 表示言語の要約（Wikipedia REST）
//!
//! 各サービスはトレイト越しに使い、テストでは差し替える。

pub mod perenual;
pub mod plant_id;
pub mod wikipedia;

pub use perenual::PerenualClient;
pub use plant_id::PlantIdClient;
pub use wikipedia::WikipediaClient;

use crate::config::Config;
use crate::error::{PlantCareError, Result};
use async_trait::async_trait;
use plant_care_common::{Candidate, CareProfile, Coordinates, ImageData, Language, LocalizedSummary};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("plant-care/", env!("CARGO_PKG_VERSION"));

/// 画像識別サービス
#[async_trait]
pub trait IdentificationService: Send + Sync {
    async fn identify(
        &self,
        image: &ImageData,
        location: Option<Coordinates>,
        language: Language,
    ) -> Result<Vec<Candidate>>;
}

/// 育て方データベース
#[async_trait]
pub trait CareService: Send + Sync {
    /// 名前で検索し、最初のヒットのIDを返す
    async fn search(&self, query: &str) -> Result<Option<u64>>;

    async fn details(&self, species_id: u64) -> Result<CareProfile>;
}

/// 百科事典の要約
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// ページがなければ Ok(None)
    async fn summary(&self, language: Language, title: &str) -> Result<Option<LocalizedSummary>>;
}

/// サービス一式
#[derive(Clone)]
pub struct Services {
    pub identification: Arc<dyn IdentificationService>,
    pub care: Arc<dyn CareService>,
    pub summary: Arc<dyn SummaryService>,
}

impl Services {
    /// 設定からHTTPクライアントを構築
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(config.timeout_seconds))?;
        let credentials = config.credentials();

        Ok(Self {
            identification: Arc::new(PlantIdClient::new(
                http.clone(),
                credentials.plant_id.unwrap_or_default(),
            )),
            care: Arc::new(PerenualClient::new(
                http.clone(),
                credentials.perenual.unwrap_or_default(),
            )),
            summary: Arc::new(WikipediaClient::new(http)),
        })
    }
}

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// 成功以外のステータスをサービスエラーにする
pub fn ensure_success(service: &'static str, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(PlantCareError::Service {
            service,
            status: status.as_u16(),
        })
    }
}
