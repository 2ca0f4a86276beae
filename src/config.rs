use crate::error::{PlantCareError, Result};
use plant_care_common::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PLANT_ID_KEY_ENV: &str = "PLANT_ID_API_KEY";
const PERENUAL_KEY_ENV: &str = "PERENUAL_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plant_id_api_key: Option<String>,
    pub perenual_api_key: Option<String>,
    pub language: Language,
    /// アップロード前に縮小する長辺の上限(px)
    pub max_image_size: u32,
    pub timeout_seconds: u64,
    pub geolocation_timeout_ms: u64,
    /// 識別後に最上位候補を自動で補完するか
    pub auto_enrich_top: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plant_id_api_key: None,
            perenual_api_key: None,
            language: Language::Hebrew,
            max_image_size: 1500,
            timeout_seconds: 30,
            geolocation_timeout_ms: 5000,
            auto_enrich_top: true,
        }
    }
}

/// 識別・補完に必要なAPIキー
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub plant_id: Option<String>,
    pub perenual: Option<String>,
}

impl Credentials {
    pub fn new(plant_id: impl Into<String>, perenual: impl Into<String>) -> Self {
        Self {
            plant_id: Some(plant_id.into()),
            perenual: Some(perenual.into()),
        }
    }

    /// 両方のキーが空でなければ true
    pub fn is_complete(&self) -> bool {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());
        present(&self.plant_id) && present(&self.perenual)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PlantCareError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("plant-care").join("config.json"))
    }

    /// APIキー（環境変数を優先）
    pub fn credentials(&self) -> Credentials {
        Credentials {
            plant_id: env_or(PLANT_ID_KEY_ENV, &self.plant_id_api_key),
            perenual: env_or(PERENUAL_KEY_ENV, &self.perenual_api_key),
        }
    }
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.language, Language::Hebrew);
        assert_eq!(config.geolocation_timeout_ms, 5000);
        assert!(config.auto_enrich_top);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            plant_id_api_key: Some("pid".into()),
            language: Language::Arabic,
            auto_enrich_top: false,
            ..Default::default()
        };
        config.save_to(&path).expect("設定保存失敗");

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.plant_id_api_key.as_deref(), Some("pid"));
        assert_eq!(loaded.language, Language::Arabic);
        assert!(!loaded.auto_enrich_top);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"language": "ar"}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.language, Language::Arabic);
        assert_eq!(loaded.max_image_size, 1500);
    }

    #[test]
    fn test_credentials_completeness() {
        assert!(Credentials::new("a", "b").is_complete());
        assert!(!Credentials::default().is_complete());
        assert!(!Credentials::new("a", "  ").is_complete());
        assert!(!Credentials {
            plant_id: None,
            perenual: Some("b".into()),
        }
        .is_complete());
    }
}
