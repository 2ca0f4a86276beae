//! Plant.id v3 識別API
//!
//! 画像をBase64でPOSTし、`result.classification.suggestions` を候補として返す。

use super::{ensure_success, IdentificationService};
use crate::error::{PlantCareError, Result};
use async_trait::async_trait;
use base64::Engine;
use plant_care_common::{Candidate, Coordinates, ImageData, Language, SimilarImage};
use serde::{Deserialize, Serialize};

const PLANT_ID_API_URL: &str = "https://api.plant.id/api/v3/identification";
const DETAILS: &str = concat!(
    "common_names,url,description,watering,best_watering,",
    "best_light_condition,best_soil_type,edible_parts,toxicity"
);

/// 識別リクエスト
#[derive(Debug, Serialize)]
struct IdentificationRequest {
    images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    similar_images: bool,
}

/// 識別レスポンス
#[derive(Debug, Deserialize)]
struct IdentificationResponse {
    result: Option<ResultBody>,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    classification: Option<Classification>,
}

#[derive(Debug, Deserialize)]
struct Classification {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    similar_images: Vec<SimilarImage>,
    details: Option<SuggestionDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SuggestionDetails {
    common_names: Option<Vec<String>>,
    url: Option<String>,
    description: Option<Description>,
}

/// 説明文は文字列または `{ "value": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Text(String),
    Cited { value: String },
}

impl Description {
    fn into_text(self) -> String {
        match self {
            Description::Text(text) => text,
            Description::Cited { value } => value,
        }
    }
}

impl From<Suggestion> for Candidate {
    fn from(s: Suggestion) -> Self {
        let details = s.details.unwrap_or_default();
        let probability = if s.probability.is_finite() {
            s.probability.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Candidate {
            id: s.id,
            name: s.name,
            probability,
            common_names: details.common_names.unwrap_or_default(),
            similar_images: s.similar_images,
            description: details
                .description
                .map(Description::into_text)
                .filter(|d| !d.trim().is_empty()),
            url: details.url,
        }
    }
}

/// 識別APIのURL（詳細フィールドと応答言語を指定）
pub fn identification_url(language: Language) -> String {
    format!(
        "{}?details={}&language={}",
        PLANT_ID_API_URL,
        DETAILS,
        urlencoding::encode(language.identification_code())
    )
}

fn build_request(image: &ImageData, location: Option<Coordinates>) -> IdentificationRequest {
    IdentificationRequest {
        images: vec![base64::engine::general_purpose::STANDARD.encode(&image.bytes)],
        latitude: location.map(|c| c.latitude),
        longitude: location.map(|c| c.longitude),
        similar_images: true,
    }
}

/// レスポンス本文から候補一覧を取り出す（サービスが返した順）
pub fn parse_suggestions(body: &str) -> Result<Vec<Candidate>> {
    let response: IdentificationResponse = serde_json::from_str(body)
        .map_err(|e| PlantCareError::ApiParse(format!("Plant.id: {}", e)))?;

    Ok(response
        .result
        .and_then(|r| r.classification)
        .map(|c| c.suggestions)
        .unwrap_or_default()
        .into_iter()
        .map(Candidate::from)
        .collect())
}

pub struct PlantIdClient {
    http: reqwest::Client,
    api_key: String,
}

impl PlantIdClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl IdentificationService for PlantIdClient {
    async fn identify(
        &self,
        image: &ImageData,
        location: Option<Coordinates>,
        language: Language,
    ) -> Result<Vec<Candidate>> {
        let request = build_request(image, location);

        tracing::debug!(
            bytes = image.bytes.len(),
            has_location = location.is_some(),
            language = language.identification_code(),
            "Querying Plant.id"
        );

        let response = self
            .http
            .post(identification_url(language))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        ensure_success("Plant.id", response.status())?;

        let body = response.text().await?;
        let candidates = parse_suggestions(&body)?;

        if let Some(top) = candidates.first() {
            tracing::info!(
                name = %top.name,
                probability = top.probability,
                candidates = candidates.len(),
                "Plant.id identification successful"
            );
        }

        Ok(candidates)
    }
}
