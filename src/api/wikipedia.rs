//! Wikipedia REST 要約API

use super::SummaryService;
use crate::error::{PlantCareError, Result};
use async_trait::async_trait;
use plant_care_common::{Language, LocalizedSummary};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    title: String,
    extract: Option<String>,
}

/// 学名からページタイトルを作る（空白 → `_`）
pub fn encyclopedia_title(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

pub fn summary_url(language: Language, title: &str) -> String {
    format!(
        "https://{}.wikipedia.org/api/rest_v1/page/summary/{}",
        language.encyclopedia_code(),
        urlencoding::encode(title)
    )
}

/// 要約があるか（404 などはページなし）
pub fn page_found(status: reqwest::StatusCode) -> bool {
    status.is_success()
}

/// 要約レスポンスをパース（本文が空なら None）
pub fn parse_summary(body: &str, language: Language) -> Result<Option<LocalizedSummary>> {
    let page: PageSummary = serde_json::from_str(body)
        .map_err(|e| PlantCareError::ApiParse(format!("Wikipedia: {}", e)))?;

    Ok(page
        .extract
        .filter(|extract| !extract.trim().is_empty())
        .map(|extract| LocalizedSummary {
            title: page.title,
            extract,
            language: language.code().to_string(),
        }))
}

pub struct WikipediaClient {
    http: reqwest::Client,
}

impl WikipediaClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SummaryService for WikipediaClient {
    async fn summary(&self, language: Language, title: &str) -> Result<Option<LocalizedSummary>> {
        let url = summary_url(language, title);
        tracing::debug!(%url, "Fetching Wikipedia summary");

        let response = self.http.get(&url).send().await?;
        if !page_found(response.status()) {
            // ページなし（404 など）は要約なし
            tracing::debug!(status = response.status().as_u16(), title, "no Wikipedia page");
            return Ok(None);
        }

        let body = response.text().await?;
        parse_summary(&body, language)
    }
}
