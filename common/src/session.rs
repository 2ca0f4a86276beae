//! セッション状態
//!
//! 画像・候補一覧・選択中の候補と、その候補に紐づく育て方/要約を保持する。
//! 選択ごとに新しい `SelectionTag` を発行し、古いタグ付きの結果は適用しない。

use crate::error::{Error, Result};
use crate::language::Language;
use crate::types::{Candidate, CareProfile, ImageData, LocalizedSummary, PreviewHandle};
use serde::Serialize;

/// 選択の識別子（単調増加）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SelectionTag(u64);

impl SelectionTag {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SelectionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 説明文のプレースホルダ
pub const DESCRIPTION_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    language: Language,
    #[serde(skip)]
    image: Option<ImageData>,
    preview: Option<PreviewHandle>,
    candidates: Vec<Candidate>,
    selected: Option<usize>,
    #[serde(skip)]
    current_tag: Option<SelectionTag>,
    #[serde(skip)]
    next_tag: u64,
    care: Option<CareProfile>,
    summary: Option<LocalizedSummary>,
    error: Option<String>,
    loading: bool,
}

impl SessionState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Default::default()
        }
    }

    // =============================================
    // 画像
    // =============================================

    /// 画像を選択し、状態をリセットする
    ///
    /// 破棄された前のプレビューハンドルを返す
    pub fn choose_image(&mut self, image: ImageData) -> Option<PreviewHandle> {
        let previous = self.clear_image();
        self.preview = Some(image.handle.clone());
        self.image = Some(image);
        previous
    }

    /// 画像と結果をすべて破棄（「別の画像を選ぶ」）
    pub fn clear_image(&mut self) -> Option<PreviewHandle> {
        self.reset_results();
        self.error = None;
        self.loading = false;
        self.image = None;
        self.preview.take()
    }

    // =============================================
    // 識別
    // =============================================

    /// 識別開始: 前回の候補・選択・育て方・要約・エラーを消去
    pub fn begin_identification(&mut self) {
        self.reset_results();
        self.error = None;
        self.loading = true;
    }

    /// 候補一覧を確信度の降順（安定ソート）で格納し、件数を返す
    pub fn finish_identification(&mut self, mut candidates: Vec<Candidate>) -> usize {
        candidates.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        self.candidates = candidates;
        self.loading = false;
        self.candidates.len()
    }

    pub fn fail_identification(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    // =============================================
    // 選択と補完結果
    // =============================================

    /// 候補を選択し、新しいタグを発行する
    pub fn select(&mut self, index: usize) -> Result<(SelectionTag, Candidate)> {
        let candidate = self
            .candidates
            .get(index)
            .cloned()
            .ok_or(Error::CandidateOutOfRange {
                index,
                len: self.candidates.len(),
            })?;

        self.next_tag += 1;
        let tag = SelectionTag(self.next_tag);
        self.current_tag = Some(tag);
        self.selected = Some(index);
        self.care = None;
        self.summary = None;
        Ok((tag, candidate))
    }

    pub fn is_current(&self, tag: SelectionTag) -> bool {
        self.current_tag == Some(tag)
    }

    /// 現在の選択のものなら育て方を適用。古いタグは false
    pub fn apply_care(&mut self, tag: SelectionTag, care: Option<CareProfile>) -> bool {
        if !self.is_current(tag) {
            return false;
        }
        self.care = care;
        true
    }

    /// 現在の選択のものなら要約を適用。古いタグは false
    pub fn apply_summary(&mut self, tag: SelectionTag, summary: Option<LocalizedSummary>) -> bool {
        if !self.is_current(tag) {
            return false;
        }
        self.summary = summary;
        true
    }

    /// 表示言語の変更（取得済みの結果は再取得しない）
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    // =============================================
    // 参照
    // =============================================

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.selected.and_then(|i| self.candidates.get(i))
    }

    pub fn current_tag(&self) -> Option<SelectionTag> {
        self.current_tag
    }

    pub fn care(&self) -> Option<&CareProfile> {
        self.care.as_ref()
    }

    pub fn summary(&self) -> Option<&LocalizedSummary> {
        self.summary.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 説明文: 百科事典の要約 → 識別サービスの説明 → プレースホルダ
    pub fn description(&self) -> &str {
        self.summary
            .as_ref()
            .map(|s| s.extract.as_str())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.selected()
                    .and_then(|c| c.description.as_deref())
                    .filter(|s| !s.trim().is_empty())
            })
            .unwrap_or(DESCRIPTION_PLACEHOLDER)
    }

    fn reset_results(&mut self) {
        self.candidates.clear();
        self.selected = None;
        self.current_tag = None;
        self.care = None;
        self.summary = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, probability: f64) -> Candidate {
        Candidate {
            id: name.to_lowercase(),
            name: name.to_string(),
            probability,
            ..Default::default()
        }
    }

    fn image(id: u64) -> ImageData {
        ImageData {
            handle: PreviewHandle {
                id,
                source: format!("plant_{}.jpg", id),
            },
            mime_type: "image/jpeg".into(),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    fn summary(extract: &str) -> LocalizedSummary {
        LocalizedSummary {
            title: "Ficus_carica".into(),
            extract: extract.into(),
            language: "he".into(),
        }
    }

    #[test]
    fn test_candidates_sorted_by_probability() {
        let mut session = SessionState::new(Language::Hebrew);
        session.begin_identification();
        let count = session.finish_identification(vec![
            candidate("Low", 0.1),
            candidate("High", 0.9),
            candidate("Mid", 0.5),
            candidate("MidToo", 0.5),
        ]);

        assert_eq!(count, 4);
        let names: Vec<_> = session.candidates().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "MidToo", "Low"]);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_select_issues_new_tags() {
        let mut session = SessionState::new(Language::Hebrew);
        session.finish_identification(vec![candidate("A", 0.8), candidate("B", 0.2)]);

        let (first, a) = session.select(0).unwrap();
        let (second, b) = session.select(1).unwrap();

        assert_eq!(a.name, "A");
        assert_eq!(b.name, "B");
        assert!(second > first);
        assert!(session.is_current(second));
        assert!(!session.is_current(first));
        assert_eq!(session.selected().map(|c| c.name.as_str()), Some("B"));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = SessionState::new(Language::Arabic);
        session.finish_identification(vec![candidate("A", 0.8)]);
        let err = session.select(3).unwrap_err();
        assert!(matches!(err, Error::CandidateOutOfRange { index: 3, len: 1 }));
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut session = SessionState::new(Language::Hebrew);
        session.finish_identification(vec![candidate("A", 0.8), candidate("B", 0.2)]);
        let (stale, _) = session.select(0).unwrap();
        let (current, _) = session.select(1).unwrap();

        assert!(!session.apply_care(stale, Some(CareProfile::default())));
        assert!(!session.apply_summary(stale, Some(summary("A"))));
        assert!(session.care().is_none());
        assert!(session.summary().is_none());

        assert!(session.apply_summary(current, Some(summary("B"))));
        assert_eq!(session.summary().map(|s| s.extract.as_str()), Some("B"));
    }

    #[test]
    fn test_begin_identification_invalidates_selection() {
        let mut session = SessionState::new(Language::Hebrew);
        session.finish_identification(vec![candidate("A", 0.8)]);
        let (tag, _) = session.select(0).unwrap();
        session.fail_identification("previous error");

        session.begin_identification();
        assert!(session.is_loading());
        assert!(session.error().is_none());
        assert!(session.candidates().is_empty());
        assert!(session.selected().is_none());
        assert!(!session.apply_care(tag, Some(CareProfile::default())));
    }

    #[test]
    fn test_choose_image_revokes_previous_preview() {
        let mut session = SessionState::new(Language::Hebrew);
        assert!(session.choose_image(image(1)).is_none());
        session.finish_identification(vec![candidate("A", 0.8)]);
        session.select(0).unwrap();

        let revoked = session.choose_image(image(2)).expect("前のハンドルが返らない");
        assert_eq!(revoked.id, 1);
        assert_eq!(session.preview().map(|p| p.id), Some(2));
        assert!(session.candidates().is_empty());
        assert!(session.current_tag().is_none());
    }

    #[test]
    fn test_clear_image() {
        let mut session = SessionState::new(Language::Hebrew);
        session.choose_image(image(5));
        let revoked = session.clear_image();
        assert_eq!(revoked.map(|p| p.id), Some(5));
        assert!(session.image().is_none());
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_description_fallback() {
        let mut session = SessionState::new(Language::Hebrew);
        let mut described = candidate("A", 0.9);
        described.description = Some("Plant.id description".into());
        session.finish_identification(vec![described, candidate("B", 0.1)]);

        assert_eq!(session.description(), DESCRIPTION_PLACEHOLDER);

        let (tag, _) = session.select(0).unwrap();
        assert_eq!(session.description(), "Plant.id description");

        session.apply_summary(tag, Some(summary("Wikipedia extract")));
        assert_eq!(session.description(), "Wikipedia extract");

        session.select(1).unwrap();
        assert_eq!(session.description(), DESCRIPTION_PLACEHOLDER);
    }

    #[test]
    fn test_language_change_keeps_results() {
        let mut session = SessionState::new(Language::Hebrew);
        session.finish_identification(vec![candidate("A", 0.9)]);
        let (tag, _) = session.select(0).unwrap();
        session.apply_summary(tag, Some(summary("עברית")));

        session.set_language(Language::Arabic);
        assert_eq!(session.language(), Language::Arabic);
        assert_eq!(session.summary().map(|s| s.language.as_str()), Some("he"));
        assert!(session.is_current(tag));
    }

    #[test]
    fn test_serialize_skips_image_bytes() {
        let mut session = SessionState::new(Language::Arabic);
        session.choose_image(image(9));
        let json = serde_json::to_string(&session).expect("シリアライズ失敗");
        assert!(json.contains("\"language\":\"ar\""));
        assert!(json.contains("plant_9.jpg"));
        assert!(!json.contains("bytes"));
    }
}
