//! セッション状態のテキスト表示

use plant_care_common::{
    care_value_label, translations, CareCategory, Language, SessionState, Translations,
};
use std::fmt::Write;

/// 一覧に表示する候補数
pub const MAX_LISTED: usize = 6;

/// 候補一覧
pub fn render_candidates(session: &SessionState) -> String {
    let t = translations(session.language());
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", t.results);

    if session.candidates().is_empty() {
        let _ = writeln!(out, "{}", t.no_matches);
        return out;
    }

    for (index, candidate) in session.candidates().iter().take(MAX_LISTED).enumerate() {
        let marker = if session.selected_index() == Some(index) { '*' } else { ' ' };
        let _ = write!(
            out,
            "{} {}. {} ({}%)",
            marker,
            index + 1,
            candidate.name,
            candidate.percent()
        );
        if !candidate.common_names.is_empty() {
            let _ = write!(out, " - {}", candidate.common_names.join(", "));
        }
        out.push('\n');
    }
    out
}

/// 選択中の候補の育て方ガイド
pub fn render_care_guide(session: &SessionState) -> Option<String> {
    let selected = session.selected()?;
    let lang = session.language();
    let t = translations(lang);
    let mut out = String::new();

    let _ = writeln!(out, "== {}: {} ==", t.care_guide, selected.name);
    let _ = writeln!(out, "{}:", t.description);
    let _ = writeln!(out, "  {}", session.description());

    if let Some(care) = session.care() {
        if let Some(watering) = care.watering.as_deref() {
            let _ = write!(
                out,
                "{}: {}",
                t.watering,
                care_value_label(lang, CareCategory::Watering, watering)
            );
            if let Some(benchmark) = &care.watering_benchmark {
                let _ = write!(out, " · {} {}", benchmark.value, benchmark.unit);
            }
            out.push('\n');
        }

        if !care.sunlight.is_empty() {
            let labels: Vec<&str> = care
                .sunlight
                .iter()
                .map(|s| care_value_label(lang, CareCategory::Sunlight, s))
                .collect();
            let _ = writeln!(out, "{}: {}", t.sunlight, labels.join(", "));
        }

        if let Some(pruning) = &care.pruning {
            let _ = writeln!(out, "{}: {} / {}", t.pruning, pruning.amount, t.per_year);
        }

        if let Some(hardiness) = &care.hardiness {
            let _ = writeln!(out, "{}: {}–{}", t.hardiness, hardiness.min, hardiness.max);
        }

        if let Some(edible) = care.edible {
            let _ = writeln!(out, "{}: {}", t.edible, if edible { t.yes } else { t.no });
        }
    }

    if let Some(url) = selected.reference_image() {
        let _ = writeln!(out, "{}: {}", t.see_more, url);
    }

    Some(out)
}

fn language_name(t: &Translations, lang: Language) -> &'static str {
    match lang {
        Language::Hebrew => t.hebrew,
        Language::Arabic => t.arabic,
    }
}

/// 言語切り替えの項目（現在の表示言語で）
pub fn render_language_toggle(current: Language, next: Language) -> String {
    let t = translations(current);
    format!(
        "{}: {} ⇄ {}",
        t.language,
        language_name(t, current),
        language_name(t, next)
    )
}

/// 画面全体（エラー → 一覧 → ガイド）
pub fn render_session(session: &SessionState) -> String {
    let t = translations(session.language());
    let mut out = format!("{}\n\n", t.app_title);

    if session.is_loading() {
        let _ = writeln!(out, "{}", t.loading);
    }
    if let Some(error) = session.error() {
        let _ = writeln!(out, "! {}\n", error);
    }

    out.push_str(&render_candidates(session));
    if let Some(guide) = render_care_guide(session) {
        out.push('\n');
        out.push_str(&guide);
    }
    out
}
