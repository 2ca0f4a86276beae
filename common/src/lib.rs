//! Plant Care Common Library
//!
//! CLIとフロントエンドで共有される型・ローカライズ・セッション状態

pub mod error;
pub mod i18n;
pub mod language;
pub mod session;
pub mod types;

pub use error::{Error, Result};
pub use i18n::{care_value_label, translations, CareCategory, Translations};
pub use language::Language;
pub use session::{SelectionTag, SessionState, DESCRIPTION_PLACEHOLDER};
pub use types::{
    Candidate, CareProfile, Coordinates, HardinessRange, ImageData, LocalizedSummary,
    PreviewHandle, PruningCount, SimilarImage, WateringBenchmark,
};
