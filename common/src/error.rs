//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown language: {0} (use he or ar)")]
    UnknownLanguage(String),

    #[error("Candidate index {index} out of range ({len} candidates)")]
    CandidateOutOfRange { index: usize, len: usize },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
