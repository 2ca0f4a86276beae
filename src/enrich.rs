//! 選択候補の補完（育て方 + 百科事典の要約）
//!
//! 2つの問い合わせは独立したタスクとして並行に走り、
//! それぞれ発行時の `SelectionTag` 付きのイベントを送る。
//! 適用するかどうか（古い選択の結果を捨てるか）は受け取る側が判断する。
//!
//! 補完は付加情報なので、失敗はここで握りつぶしてログに残すだけにする。

use crate::api::wikipedia::encyclopedia_title;
use crate::api::{CareService, SummaryService};
use crate::error::PlantCareError;
use plant_care_common::{Candidate, CareProfile, Language, LocalizedSummary, SelectionTag};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 補完結果（発行時のタグ付き）
#[derive(Debug, Clone)]
pub enum EnrichmentEvent {
    Care {
        tag: SelectionTag,
        profile: Option<CareProfile>,
    },
    Summary {
        tag: SelectionTag,
        summary: Option<LocalizedSummary>,
    },
}

impl EnrichmentEvent {
    pub fn tag(&self) -> SelectionTag {
        match self {
            EnrichmentEvent::Care { tag, .. } | EnrichmentEvent::Summary { tag, .. } => *tag,
        }
    }
}

/// 1回の選択で発行する問い合わせ数
pub const LOOKUPS_PER_SELECTION: usize = 2;

#[derive(Clone)]
pub struct Enricher {
    care: Arc<dyn CareService>,
    summary: Arc<dyn SummaryService>,
    events: mpsc::UnboundedSender<EnrichmentEvent>,
}

impl Enricher {
    pub fn new(
        care: Arc<dyn CareService>,
        summary: Arc<dyn SummaryService>,
    ) -> (Self, mpsc::UnboundedReceiver<EnrichmentEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                care,
                summary,
                events,
            },
            receiver,
        )
    }

    /// 育て方と要約の問い合わせを開始する
    pub fn spawn(
        &self,
        tag: SelectionTag,
        candidate: &Candidate,
        language: Language,
    ) -> [JoinHandle<()>; 2] {
        let name = candidate.name.clone();
        tracing::debug!(%tag, name = %name, language = %language, "starting enrichment");

        let care_task = {
            let service = Arc::clone(&self.care);
            let events = self.events.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let profile = lookup_care(service.as_ref(), &name).await;
                // 受信側が終了していれば結果は不要
                let _ = events.send(EnrichmentEvent::Care { tag, profile });
            })
        };

        let summary_task = {
            let service = Arc::clone(&self.summary);
            let events = self.events.clone();
            tokio::spawn(async move {
                let summary = lookup_summary(service.as_ref(), language, &name).await;
                let _ = events.send(EnrichmentEvent::Summary { tag, summary });
            })
        };

        [care_task, summary_task]
    }
}

/// 学名で検索し、ヒットがあれば詳細を取得
pub async fn lookup_care(service: &dyn CareService, scientific_name: &str) -> Option<CareProfile> {
    let query = scientific_name.trim();
    if query.is_empty() {
        return None;
    }

    let species_id = match service.search(query).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::debug!(query, "no care record found");
            return None;
        }
        Err(e) => return ignore_lookup_failure("care search", &e),
    };

    match service.details(species_id).await {
        Ok(profile) => Some(profile),
        Err(e) => ignore_lookup_failure("care details", &e),
    }
}

/// 表示言語の要約を取得
pub async fn lookup_summary(
    service: &dyn SummaryService,
    language: Language,
    scientific_name: &str,
) -> Option<LocalizedSummary> {
    let title = encyclopedia_title(scientific_name);
    if title.is_empty() {
        return None;
    }

    match service.summary(language, &title).await {
        Ok(summary) => summary,
        Err(e) => ignore_lookup_failure("summary", &e),
    }
}

/// 補完の失敗は表示に出さず「データなし」とする
fn ignore_lookup_failure<T>(lookup: &str, error: &PlantCareError) -> Option<T> {
    tracing::warn!(lookup, error = %error, "enrichment lookup failed; showing no data");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCare {
        hit: Option<u64>,
        fail_search: bool,
        fail_details: bool,
        detail_calls: AtomicUsize,
    }

    #[async_trait]
    impl CareService for FakeCare {
        async fn search(&self, _query: &str) -> Result<Option<u64>> {
            if self.fail_search {
                return Err(PlantCareError::Network("connection reset".into()));
            }
            Ok(self.hit)
        }

        async fn details(&self, species_id: u64) -> Result<CareProfile> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_details {
                return Err(PlantCareError::Service {
                    service: "Perenual",
                    status: 500,
                });
            }
            Ok(CareProfile {
                species_id,
                watering: Some("Average".into()),
                ..Default::default()
            })
        }
    }

    struct FakeSummary {
        titles: std::sync::Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl SummaryService for FakeSummary {
        async fn summary(
            &self,
            language: Language,
            title: &str,
        ) -> Result<Option<LocalizedSummary>> {
            self.titles.lock().unwrap().push(title.to_string());
            if self.fail {
                return Err(PlantCareError::Network("timeout".into()));
            }
            Ok(Some(LocalizedSummary {
                title: title.into(),
                extract: format!("{} extract", title),
                language: language.code().into(),
            }))
        }
    }

    fn summary_service(fail: bool) -> FakeSummary {
        FakeSummary {
            titles: std::sync::Mutex::new(Vec::new()),
            fail,
        }
    }

    #[tokio::test]
    async fn test_care_found() {
        let service = FakeCare {
            hit: Some(12),
            ..Default::default()
        };
        let profile = lookup_care(&service, "Ficus carica").await.unwrap();
        assert_eq!(profile.species_id, 12);
    }

    #[tokio::test]
    async fn test_care_no_hit_skips_details() {
        let service = FakeCare::default();
        assert!(lookup_care(&service, "Ficus carica").await.is_none());
        assert_eq!(service.detail_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_care_failures_are_swallowed() {
        let search_fails = FakeCare {
            fail_search: true,
            ..Default::default()
        };
        assert!(lookup_care(&search_fails, "Ficus").await.is_none());

        let details_fail = FakeCare {
            hit: Some(3),
            fail_details: true,
            ..Default::default()
        };
        assert!(lookup_care(&details_fail, "Ficus").await.is_none());
    }

    #[tokio::test]
    async fn test_summary_normalizes_title() {
        let service = summary_service(false);
        let summary = lookup_summary(&service, Language::Arabic, "Olea  europaea").await.unwrap();
        assert_eq!(summary.language, "ar");
        assert_eq!(service.titles.lock().unwrap().as_slice(), ["Olea_europaea"]);
    }

    #[tokio::test]
    async fn test_summary_failure_is_swallowed() {
        let service = summary_service(true);
        assert!(lookup_summary(&service, Language::Hebrew, "Rosa").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_name_skips_lookups() {
        let service = summary_service(false);
        assert!(lookup_summary(&service, Language::Hebrew, "   ").await.is_none());
        assert!(service.titles.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_sends_tagged_events() {
        let care: Arc<dyn CareService> = Arc::new(FakeCare::default());
        let summary: Arc<dyn SummaryService> = Arc::new(summary_service(false));
        let (enricher, mut events) = Enricher::new(care, summary);

        let mut session = plant_care_common::SessionState::new(Language::Hebrew);
        session.finish_identification(vec![Candidate::named("Ficus carica")]);
        let (tag, candidate) = session.select(0).unwrap();

        for handle in enricher.spawn(tag, &candidate, Language::Hebrew) {
            handle.await.unwrap();
        }

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        assert_eq!(received.len(), LOOKUPS_PER_SELECTION);
        assert!(received.iter().all(|e| e.tag() == tag));
        // ケア情報なしでも要約は独立して取得される
        assert!(received
            .iter()
            .any(|e| matches!(e, EnrichmentEvent::Care { profile: None, .. })));
        assert!(received
            .iter()
            .any(|e| matches!(e, EnrichmentEvent::Summary { summary: Some(_), .. })));
    }
}
