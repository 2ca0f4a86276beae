//! 表示言語

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 表示言語（どちらも右から左へ書く文字体系）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Hebrew, Language::Arabic];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Hebrew => "he",
            Language::Arabic => "ar",
        }
    }

    /// 識別サービスへ渡す言語
    ///
    /// Plant.id はヘブライ語非対応のため英語にフォールバックする
    pub fn identification_code(&self) -> &'static str {
        match self {
            Language::Hebrew => "en",
            Language::Arabic => "ar",
        }
    }

    /// Wikipedia のサブドメイン
    pub fn encyclopedia_code(&self) -> &'static str {
        self.code()
    }

    pub fn is_rtl(&self) -> bool {
        true
    }
}

impl std::str::FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "he" | "heb" | "hebrew" | "iw" => Ok(Language::Hebrew),
            "ar" | "ara" | "arabic" => Ok(Language::Arabic),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
