//! UI文字列テーブルと育て方の値ラベル変換
//!
//! Perenual の列挙値（Frequent, Full sun など）を表示言語のラベルに変換する。
//! 未登録の値はそのまま返す。

use crate::language::Language;

/// UI文字列
#[derive(Debug, Clone, Copy)]
pub struct Translations {
    pub app_title: &'static str,
    pub language: &'static str,
    pub hebrew: &'static str,
    pub arabic: &'static str,
    pub results: &'static str,
    pub care_guide: &'static str,
    pub description: &'static str,
    pub watering: &'static str,
    pub sunlight: &'static str,
    pub pruning: &'static str,
    pub hardiness: &'static str,
    pub edible: &'static str,
    pub yes: &'static str,
    pub no: &'static str,
    pub loading: &'static str,
    pub identify_first: &'static str,
    pub error_api_key: &'static str,
    pub no_matches: &'static str,
    pub see_more: &'static str,
    /// 剪定回数の単位（/年）
    pub per_year: &'static str,
}

const HEBREW: Translations = Translations {
    app_title: "מזהה צמחים + מדריך טיפול",
    language: "שפה",
    hebrew: "עברית",
    arabic: "العربية",
    results: "תוצאות",
    care_guide: "מדריך טיפול",
    description: "תיאור",
    watering: "השקיה",
    sunlight: "אור",
    pruning: "גיזום",
    hardiness: "עמידות לקור (אזור)",
    edible: "אכיל",
    yes: "כן",
    no: "לא",
    loading: "טוען...",
    identify_first: "נא לזהות צמח תחילה",
    error_api_key: "נא להזין מפתחות API תקינים בהגדרות.",
    no_matches: "לא נמצאו התאמות",
    see_more: "פרטים נוספים",
    per_year: "שנה",
};

const ARABIC: Translations = Translations {
    app_title: "تعرّف على النباتات + دليل العناية",
    language: "اللغة",
    hebrew: "עברית",
    arabic: "العربية",
    results: "النتائج",
    care_guide: "دليل العناية",
    description: "الوصف",
    watering: "الري",
    sunlight: "الضوء",
    pruning: "التقليم",
    hardiness: "تحمّل البرودة (المنطقة)",
    edible: "صالحة للأكل",
    yes: "نعم",
    no: "لا",
    loading: "جارٍ التحميل...",
    identify_first: "رجاءً حدّد النبات أولًا",
    error_api_key: "رجاءً أضف مفاتيح API صحيحة في الإعدادات.",
    no_matches: "لا توجد تطابقات",
    see_more: "تفاصيل أكثر",
    per_year: "سنة",
};

/// 言語のUI文字列テーブル
pub fn translations(lang: Language) -> &'static Translations {
    match lang {
        Language::Hebrew => &HEBREW,
        Language::Arabic => &ARABIC,
    }
}

/// ラベル変換対象の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareCategory {
    Watering,
    Sunlight,
}

fn care_label(lang: Language, category: CareCategory, value: &str) -> Option<&'static str> {
    let label = match (category, lang, value) {
        (CareCategory::Watering, Language::Hebrew, "Frequent") => "השקיה תכופה",
        (CareCategory::Watering, Language::Hebrew, "Average") => "השקיה בינונית",
        (CareCategory::Watering, Language::Hebrew, "Minimum") => "מעט השקיה",
        (CareCategory::Watering, Language::Hebrew, "None") => "ללא השקיה",
        (CareCategory::Watering, Language::Arabic, "Frequent") => "ري متكرر",
        (CareCategory::Watering, Language::Arabic, "Average") => "ري متوسط",
        (CareCategory::Watering, Language::Arabic, "Minimum") => "ري قليل",
        (CareCategory::Watering, Language::Arabic, "None") => "دون ري",
        (CareCategory::Sunlight, Language::Hebrew, "Full sun") => "שמש מלאה",
        (CareCategory::Sunlight, Language::Hebrew, "Part shade") => "חצי צל",
        (CareCategory::Sunlight, Language::Hebrew, "Full shade") => "צל מלא",
        (CareCategory::Sunlight, Language::Hebrew, "sun-part_shade") => "שמש/חצי צל",
        (CareCategory::Sunlight, Language::Arabic, "Full sun") => "شمس كاملة",
        (CareCategory::Sunlight, Language::Arabic, "Part shade") => "ظل جزئي",
        (CareCategory::Sunlight, Language::Arabic, "Full shade") => "ظل كامل",
        (CareCategory::Sunlight, Language::Arabic, "sun-part_shade") => "شمس/ظل جزئي",
        _ => return None,
    };
    Some(label)
}

/// 上流の列挙値を表示ラベルに変換（未登録はそのまま）
pub fn care_value_label<'a>(lang: Language, category: CareCategory, value: &'a str) -> &'a str {
    care_label(lang, category, value).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watering_labels() {
        assert_eq!(
            care_value_label(Language::Hebrew, CareCategory::Watering, "Frequent"),
            "השקיה תכופה"
        );
        assert_eq!(
            care_value_label(Language::Arabic, CareCategory::Watering, "Minimum"),
            "ري قليل"
        );
    }

    #[test]
    fn test_sunlight_labels() {
        assert_eq!(
            care_value_label(Language::Arabic, CareCategory::Sunlight, "sun-part_shade"),
            "شمس/ظل جزئي"
        );
        assert_eq!(
            care_value_label(Language::Hebrew, CareCategory::Sunlight, "Full shade"),
            "צל מלא"
        );
    }

    #[test]
    fn test_unmapped_value_passes_through() {
        assert_eq!(
            care_value_label(Language::Hebrew, CareCategory::Sunlight, "filtered shade"),
            "filtered shade"
        );
        // 区分違いの値は変換しない
        assert_eq!(
            care_value_label(Language::Arabic, CareCategory::Watering, "Full sun"),
            "Full sun"
        );
        assert_eq!(care_value_label(Language::Arabic, CareCategory::Watering, ""), "");
    }

    #[test]
    fn test_translations_per_language() {
        assert_eq!(translations(Language::Hebrew).yes, "כן");
        assert_eq!(translations(Language::Arabic).yes, "نعم");
        assert_ne!(
            translations(Language::Hebrew).error_api_key,
            translations(Language::Arabic).error_api_key
        );
    }
}
