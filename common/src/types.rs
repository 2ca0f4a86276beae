//! 植物識別・育て方データの型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - Candidate: 識別サービスが返す候補（確信度の降順）
//! - CareProfile: 園芸データベースから取得した育て方
//! - LocalizedSummary: 選択言語の百科事典要約

use serde::{Deserialize, Serialize};

/// 緯度経度（識別精度向上のためのヒント）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// 範囲外の値は None
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }
}

/// 類似画像の参照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarImage {
    pub url: String,
    pub url_small: Option<String>,
}

/// 識別候補（1つの分類群の推定）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub id: String,
    /// 学名
    pub name: String,
    /// 確信度 0.0〜1.0
    pub probability: f64,
    pub common_names: Vec<String>,
    pub similar_images: Vec<SimilarImage>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl Candidate {
    /// 学名だけの候補（careコマンド用）
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            probability: 1.0,
            ..Default::default()
        }
    }

    /// 確信度をパーセント表示用に丸める
    pub fn percent(&self) -> u32 {
        (self.probability.clamp(0.0, 1.0) * 100.0).round() as u32
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.similar_images.first().and_then(|img| img.url_small.as_deref())
    }

    pub fn reference_image(&self) -> Option<&str> {
        self.similar_images
            .first()
            .map(|img| img.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// 水やり目安（例: "7-10" days）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WateringBenchmark {
    pub value: String,
    pub unit: String,
}

/// 剪定回数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningCount {
    pub amount: u32,
    pub interval: Option<String>,
}

/// 耐寒性ゾーンの範囲
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardinessRange {
    pub min: String,
    pub max: String,
}

/// 育て方プロファイル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareProfile {
    pub species_id: u64,
    /// Frequent / Average / Minimum / None
    pub watering: Option<String>,
    pub watering_benchmark: Option<WateringBenchmark>,
    /// 日照区分（重複なし、出現順）
    pub sunlight: Vec<String>,
    pub pruning: Option<PruningCount>,
    pub hardiness: Option<HardinessRange>,
    pub edible: Option<bool>,
}

impl CareProfile {
    /// 日照区分を重複除去して設定
    pub fn set_sunlight<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sunlight.clear();
        for value in values {
            let value = value.into();
            if !value.trim().is_empty() && !self.sunlight.contains(&value) {
                self.sunlight.push(value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.watering.is_none()
            && self.sunlight.is_empty()
            && self.pruning.is_none()
            && self.hardiness.is_none()
            && self.edible.is_none()
    }
}

/// 読み込んだ画像のプレビューハンドル
///
/// 新しい画像を選ぶと前のハンドルは破棄（revoke）される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewHandle {
    pub id: u64,
    /// 表示用のソース（ファイルパスなど）
    pub source: String,
}

/// アップロード対象の画像
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub handle: PreviewHandle,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// 百科事典の要約
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedSummary {
    pub title: String,
    pub extract: String,
    /// 取得時の言語コード
    pub language: String,
}
