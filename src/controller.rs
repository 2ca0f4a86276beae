//! 識別 → 選択 → 補完 のワークフロー
//!
//! `Controller` がセッション状態を専有し、補完タスクからのイベントを
//! 受け取って現在の選択に一致するものだけを適用する。

use crate::api::{IdentificationService, Services};
use crate::config::Credentials;
use crate::enrich::{Enricher, EnrichmentEvent, LOOKUPS_PER_SELECTION};
use crate::error::{PlantCareError, Result};
use plant_care_common::{
    translations, Candidate, Coordinates, ImageData, Language, PreviewHandle, SelectionTag,
    SessionState,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 識別成功後に最上位候補を自動で補完するか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoEnrich {
    #[default]
    TopCandidate,
    Off,
}

impl From<bool> for AutoEnrich {
    fn from(enabled: bool) -> Self {
        if enabled {
            AutoEnrich::TopCandidate
        } else {
            AutoEnrich::Off
        }
    }
}

pub struct Controller {
    credentials: Credentials,
    auto_enrich: AutoEnrich,
    identifier: Arc<dyn IdentificationService>,
    enricher: Enricher,
    events: mpsc::UnboundedReceiver<EnrichmentEvent>,
    /// 現在の選択でまだ届いていない補完結果の数
    pending: usize,
    /// 現在の選択の補完タスク
    tasks: Vec<JoinHandle<()>>,
    location: Option<Coordinates>,
    session: SessionState,
}

impl Controller {
    pub fn new(
        credentials: Credentials,
        auto_enrich: AutoEnrich,
        services: Services,
        language: Language,
    ) -> Self {
        let (enricher, events) = Enricher::new(services.care, services.summary);
        Self {
            credentials,
            auto_enrich,
            identifier: services.identification,
            enricher,
            events,
            pending: 0,
            tasks: Vec::new(),
            location: None,
            session: SessionState::new(language),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn set_location(&mut self, location: Option<Coordinates>) {
        self.location = location;
    }

    /// 表示言語を変更（取得済みの補完は再取得しない）
    pub fn set_language(&mut self, language: Language) {
        self.session.set_language(language);
    }

    /// 画像を選択（前のプレビューは破棄）
    pub fn choose_image(&mut self, image: ImageData) {
        self.forget_enrichment();
        let revoked = self.session.choose_image(image);
        log_revoked(revoked);
    }

    /// 画像と結果をすべて破棄
    pub fn clear_image(&mut self) {
        self.forget_enrichment();
        let revoked = self.session.clear_image();
        log_revoked(revoked);
    }

    /// 識別を実行し、候補数を返す
    ///
    /// 失敗時はエラー欄に表示用メッセージを入れた上でエラーを返す。
    pub async fn identify(&mut self) -> Result<usize> {
        self.session.begin_identification();
        self.forget_enrichment();

        match self.request_identification().await {
            Ok(candidates) => {
                let count = self.session.finish_identification(candidates);
                if count > 0 && self.auto_enrich == AutoEnrich::TopCandidate {
                    self.select(0)?;
                }
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "identification failed");
                let message = self.user_message(&e);
                self.session.fail_identification(message);
                Err(e)
            }
        }
    }

    /// APIキーが揃っているか確認（画像の読み込み前に呼べる）
    ///
    /// 不足していればエラー欄に表示用メッセージを入れた上でエラーを返す。
    pub fn ensure_credentials(&mut self) -> Result<()> {
        if self.credentials.is_complete() {
            return Ok(());
        }
        let e = PlantCareError::MissingApiKey;
        let message = self.user_message(&e);
        self.session.fail_identification(message);
        Err(e)
    }

    async fn request_identification(&self) -> Result<Vec<Candidate>> {
        if !self.credentials.is_complete() {
            return Err(PlantCareError::MissingApiKey);
        }
        let image = self.session.image().ok_or(PlantCareError::NoImageSelected)?;

        self.identifier
            .identify(image, self.location, self.session.language())
            .await
    }

    /// 識別を経ずに候補一覧を差し込む（名前だけで補完する場合）
    pub fn present_candidates(&mut self, candidates: Vec<Candidate>) -> usize {
        self.session.begin_identification();
        self.forget_enrichment();
        self.session.finish_identification(candidates)
    }

    /// 候補を選択して補完を開始する
    ///
    /// 前の選択の問い合わせは中断せず、結果が届いた時点で捨てる。
    pub fn select(&mut self, index: usize) -> Result<SelectionTag> {
        let (tag, candidate) = self.session.select(index)?;
        let tasks = self.enricher.spawn(tag, &candidate, self.session.language());
        self.tasks = Vec::from(tasks);
        self.pending = LOOKUPS_PER_SELECTION;
        Ok(tag)
    }

    /// イベントを適用。現在の選択のものでなければ捨てて false
    pub fn apply(&mut self, event: EnrichmentEvent) -> bool {
        let tag = event.tag();
        let applied = match event {
            EnrichmentEvent::Care { tag, profile } => self.session.apply_care(tag, profile),
            EnrichmentEvent::Summary { tag, summary } => self.session.apply_summary(tag, summary),
        };

        if applied {
            self.pending = self.pending.saturating_sub(1);
        } else {
            tracing::debug!(%tag, "discarding stale enrichment result");
        }
        applied
    }

    /// 届いているイベントだけを処理（待たない）
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// 現在の選択の補完がすべて届くまで待つ
    ///
    /// 結果を送らずに終わったタスク（パニックなど）の分は「データなし」のまま諦める。
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            let event = tokio::select! {
                biased;
                event = self.events.recv() => event,
                _ = join_tasks(&mut self.tasks) => None,
            };

            match event {
                Some(event) => {
                    self.apply(event);
                }
                None => {
                    // タスクは終了済みなので、送られた結果はすべてチャネルにある
                    self.drain_ready();
                    if self.pending > 0 {
                        tracing::warn!(missing = self.pending, "enrichment ended without a result");
                        self.pending = 0;
                    }
                    break;
                }
            }
        }
    }

    pub fn is_enriching(&self) -> bool {
        self.pending > 0
    }

    /// 進行中の補完を待たない（タスクは走り切り、結果は古いタグとして捨てられる）
    fn forget_enrichment(&mut self) {
        self.pending = 0;
        self.tasks.clear();
    }

    /// エラーの表示用メッセージ（前提条件エラーは表示言語で）
    fn user_message(&self, error: &PlantCareError) -> String {
        let t = translations(self.session.language());
        match error {
            PlantCareError::MissingApiKey => t.error_api_key.to_string(),
            PlantCareError::NoImageSelected => t.identify_first.to_string(),
            other => other.to_string(),
        }
    }
}

/// タスクをすべて待つ。終わったものは取り除くので、途中で打ち切られても再開できる
async fn join_tasks(tasks: &mut Vec<JoinHandle<()>>) {
    while let Some(task) = tasks.last_mut() {
        let result = task.await;
        tasks.pop();
        if let Err(e) = result {
            tracing::warn!(error = %e, "enrichment task failed");
        }
    }
}

fn log_revoked(handle: Option<PreviewHandle>) {
    if let Some(handle) = handle {
        tracing::debug!(id = handle.id, source = %handle.source, "preview revoked");
    }
}
