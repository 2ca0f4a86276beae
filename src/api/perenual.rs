//! Perenual 植物データベース
//!
//! 1. species-list を学名で検索し、最初のヒットのIDを得る
//! 2. species/details/{id} で育て方を取得
//!
//! 詳細レコードはフィールドの型が揺れる（数値/文字列、空配列など）ため
//! `serde_json::Value` 経由で寛容に読む。

use super::{ensure_success, CareService};
use crate::error::{PlantCareError, Result};
use async_trait::async_trait;
use plant_care_common::{CareProfile, HardinessRange, PruningCount, WateringBenchmark};
use serde::Deserialize;
use serde_json::Value;

const PERENUAL_BASE_URL: &str = "https://perenual.com/api/v2";

#[derive(Debug, Deserialize)]
struct SpeciesList {
    #[serde(default)]
    data: Vec<SpeciesHit>,
}

#[derive(Debug, Deserialize)]
struct SpeciesHit {
    id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpeciesDetails {
    id: Option<Value>,
    watering: Option<String>,
    watering_general_benchmark: Option<Value>,
    sunlight: Option<Value>,
    pruning_count: Option<Value>,
    hardiness: Option<Value>,
    edible_fruit: Option<bool>,
    edible_leaf: Option<bool>,
    seeds: Option<Value>,
}

/// 最初のヒットのIDを取り出す
pub fn parse_first_species_id(body: &str) -> Result<Option<u64>> {
    let list: SpeciesList = serde_json::from_str(body)
        .map_err(|e| PlantCareError::ApiParse(format!("Perenual species-list: {}", e)))?;
    Ok(list.data.first().and_then(|hit| hit.id.as_ref()).and_then(as_u64))
}

/// 詳細レコードを CareProfile に変換
pub fn parse_species_details(body: &str, species_id: u64) -> Result<CareProfile> {
    let details: SpeciesDetails = serde_json::from_str(body)
        .map_err(|e| PlantCareError::ApiParse(format!("Perenual details: {}", e)))?;

    let edible = edible(&details);
    let mut profile = CareProfile {
        species_id: details.id.as_ref().and_then(as_u64).unwrap_or(species_id),
        watering: details.watering.filter(|w| !w.trim().is_empty()),
        watering_benchmark: details.watering_general_benchmark.as_ref().and_then(benchmark),
        pruning: details.pruning_count.as_ref().and_then(pruning),
        hardiness: details.hardiness.as_ref().and_then(hardiness),
        edible,
        ..Default::default()
    };

    if let Some(Value::Array(values)) = &details.sunlight {
        profile.set_sunlight(values.iter().filter_map(as_text));
    }

    Ok(profile)
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn benchmark(value: &Value) -> Option<WateringBenchmark> {
    let amount = as_text(value.get("value")?)?;
    let unit = value.get("unit").and_then(as_text).unwrap_or_default();
    Some(WateringBenchmark { value: amount, unit })
}

/// 剪定回数（量の指定がなければ 1）
fn pruning(value: &Value) -> Option<PruningCount> {
    // 情報がない場合は空配列が返る
    let object = value.as_object()?;
    let amount = object
        .get("amount")
        .and_then(as_u64)
        .filter(|a| *a > 0)
        .unwrap_or(1);
    Some(PruningCount {
        amount: u32::try_from(amount).unwrap_or(u32::MAX),
        interval: object.get("interval").and_then(as_text),
    })
}

fn hardiness(value: &Value) -> Option<HardinessRange> {
    let min = value.get("min").and_then(as_text)?;
    let max = value.get("max").and_then(as_text)?;
    Some(HardinessRange { min, max })
}

/// 食用フラグ: edible_fruit/edible_leaf、なければ種子数
fn edible(details: &SpeciesDetails) -> Option<bool> {
    match (details.edible_fruit, details.edible_leaf) {
        (None, None) => details
            .seeds
            .as_ref()
            .and_then(|v| v.as_f64())
            .map(|seeds| seeds > 0.0),
        (fruit, leaf) => Some(fruit.unwrap_or(false) || leaf.unwrap_or(false)),
    }
}

pub struct PerenualClient {
    http: reqwest::Client,
    api_key: String,
}

impl PerenualClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        ensure_success("Perenual", response.status())?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CareService for PerenualClient {
    async fn search(&self, query: &str) -> Result<Option<u64>> {
        tracing::debug!(query, "Searching Perenual species");
        let body = self
            .get(&format!("{}/species-list", PERENUAL_BASE_URL), &[("q", query)])
            .await?;
        parse_first_species_id(&body)
    }

    async fn details(&self, species_id: u64) -> Result<CareProfile> {
        tracing::debug!(species_id, "Fetching Perenual species details");
        let body = self
            .get(&format!("{}/species/details/{}", PERENUAL_BASE_URL, species_id), &[])
            .await?;
        parse_species_details(&body, species_id)
    }
}
