use super::draft_store::DraftStore;
use super::media::PreviewConverter;
use super::submission::ItemSubmitter;
use super::wizard::{InitState, WizardError, WizardState};
use crate::shared::catalog::{self, CatalogFile, CatalogSnapshot, CatalogSource};
use contracts::domain::a025_item_category::CategoryId;
use contracts::domain::a027_inventory_item::{
    ItemDraftPatch, MediaAttachment, MediaFile, MediaSlot, ThumbnailSettings,
};
use contracts::domain::common::AggregateId;
use contracts::usecases::u508_create_inventory_item::{
    StartWizardRequest, SubmitResponse, WizardView,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Сессия мастера: состояние и ключ черновика
struct WizardSession {
    draft_key: String,
    state: WizardState,
}

type SessionHandle = Arc<tokio::sync::Mutex<WizardSession>>;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Реестр открытых сессий мастера (in-memory).
/// Сессия без обращений дольше `idle_timeout` закрывается.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    idle_timeout: Option<Duration>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    fn is_idle(&self, entry: &SessionEntry, now: Instant) -> bool {
        self.idle_timeout
            .is_some_and(|idle| now.duration_since(entry.last_seen) >= idle)
    }

    fn insert(&self, session_id: String, handle: SessionHandle) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(
            session_id,
            SessionEntry {
                handle,
                last_seen: Instant::now(),
            },
        );
    }

    /// Найти сессию и отметить обращение; просроченная сессия удаляется
    fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let entry = sessions.get_mut(session_id)?;
        if self.is_idle(entry, now) {
            sessions.remove(session_id);
            tracing::info!("Wizard session {} expired after inactivity", session_id);
            return None;
        }
        entry.last_seen = now;
        Some(Arc::clone(&entry.handle))
    }

    fn remove(&self, session_id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(session_id).map(|entry| entry.handle)
    }

    /// Удалить простаивающие сессии. Сессия, занятая запросом, остается.
    pub fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let busy = entry.handle.try_lock().is_err();
            busy || !self.is_idle(entry, now)
        });
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Executor для UseCase создания позиции склада
pub struct WizardExecutor {
    catalog_source: Arc<dyn CatalogSource>,
    drafts: DraftStore,
    submitter: Arc<dyn ItemSubmitter>,
    previews: Arc<dyn PreviewConverter>,
    sessions: SessionRegistry,
}

fn parse_id(raw: Option<&str>) -> Option<CategoryId> {
    match CategoryId::from_optional(raw) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Ignoring deep-link parameter {:?}: {}", raw, e);
            None
        }
    }
}

impl WizardExecutor {
    pub fn new(
        catalog_source: Arc<dyn CatalogSource>,
        drafts: DraftStore,
        submitter: Arc<dyn ItemSubmitter>,
        previews: Arc<dyn PreviewConverter>,
    ) -> Self {
        Self {
            catalog_source,
            drafts,
            submitter,
            previews,
            sessions: SessionRegistry::new(),
        }
    }

    /// Закрывать сессии после простоя; `None` оставляет их открытыми до `close`
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.sessions = SessionRegistry::with_idle_timeout(idle_timeout);
        self
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Закрыть простаивающие сессии; черновики остаются в хранилище
    pub fn evict_idle_sessions(&self) -> usize {
        let evicted = self.sessions.evict_idle();
        if evicted > 0 {
            tracing::info!("Evicted {} idle wizard session(s)", evicted);
        }
        evicted
    }

    async fn load_catalog(&self) -> Result<CatalogSnapshot, WizardError> {
        catalog::load_snapshot(self.catalog_source.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to load catalog: {}", e);
                WizardError::CatalogUnavailable(e.to_string())
            })
    }

    /// Справочники для клиента
    pub async fn catalog(&self) -> Result<CatalogFile, WizardError> {
        let snapshot = self.load_catalog().await?;
        Ok(CatalogFile {
            categories: snapshot.categories.all().to_vec(),
            attribute_types: snapshot.attributes.types().to_vec(),
            attribute_values: snapshot.attributes.values().to_vec(),
        })
    }

    /// Открыть мастер. Ссылка на категорию исключает восстановление черновика;
    /// нераспознанная ссылка считается отсутствующей.
    pub async fn start(&self, request: StartWizardRequest) -> Result<WizardView, WizardError> {
        self.evict_idle_sessions();

        let snapshot = Arc::new(self.load_catalog().await?);
        let mut state = WizardState::new(Arc::clone(&snapshot));
        let draft_key = DraftStore::key_for(request.draft_key.as_deref());

        if request.has_deep_link() {
            let category_id = parse_id(request.category_id.as_deref());
            let subcategory_id = parse_id(request.subcategory_id.as_deref());
            match snapshot
                .categories
                .resolve_deep_link(category_id, subcategory_id)
            {
                Some(target) => {
                    state.initialize_from_deep_link(target)?;
                }
                None => tracing::warn!(
                    "Deep link {:?}/{:?} does not resolve, restoring draft instead",
                    request.category_id,
                    request.subcategory_id
                ),
            }
        }

        if state.init_state() == InitState::NotStarted {
            let restored = self.drafts.restore(&draft_key).await;
            state.apply_restored(restored);
        }

        let session_id = Uuid::new_v4().to_string();
        let view = state.view(&session_id);
        self.drafts.persist(&draft_key, &state.snapshot());

        tracing::info!(
            "Wizard session {} started ({:?}, draft key {})",
            session_id,
            state.init_state(),
            draft_key
        );

        self.sessions.insert(
            session_id,
            Arc::new(tokio::sync::Mutex::new(WizardSession { draft_key, state })),
        );
        Ok(view)
    }

    fn session(&self, session_id: &str) -> Result<SessionHandle, WizardError> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| WizardError::SessionNotFound(session_id.to_string()))
    }

    pub async fn view(&self, session_id: &str) -> Result<WizardView, WizardError> {
        let handle = self.session(session_id)?;
        let session = handle.lock().await;
        Ok(session.state.view(session_id))
    }

    /// Закрыть сессию; черновик остается в хранилище
    pub async fn close(&self, session_id: &str) -> Result<(), WizardError> {
        self.sessions
            .remove(session_id)
            .ok_or_else(|| WizardError::SessionNotFound(session_id.to_string()))?;
        self.drafts.flush().await;
        tracing::info!("Wizard session {} closed", session_id);
        Ok(())
    }

    /// Изменить состояние под блокировкой сессии и запланировать сохранение черновика
    async fn mutate<F>(&self, session_id: &str, change: F) -> Result<WizardView, WizardError>
    where
        F: FnOnce(&mut WizardState) -> Result<(), WizardError>,
    {
        let handle = self.session(session_id)?;
        let mut session = handle.lock().await;
        if session.state.is_submitted() {
            return Err(WizardError::AlreadySubmitted);
        }
        if session.state.is_submitting() {
            return Err(WizardError::SubmissionInProgress);
        }

        // отказ перехода мог сдвинуть курсор, поэтому снимок сохраняется в любом случае
        let result = change(&mut session.state);
        self.drafts
            .persist(&session.draft_key, &session.state.snapshot());
        result.map(|()| session.state.view(session_id))
    }

    pub async fn update(
        &self,
        session_id: &str,
        patch: ItemDraftPatch,
    ) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| state.update_form_data(patch))
            .await
    }

    pub async fn select_category(
        &self,
        session_id: &str,
        category_id: CategoryId,
    ) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| state.select_category(category_id))
            .await
    }

    pub async fn select_subcategory(
        &self,
        session_id: &str,
        subcategory_id: CategoryId,
    ) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| state.select_subcategory(subcategory_id))
            .await
    }

    pub async fn next(&self, session_id: &str) -> Result<WizardView, WizardError> {
        self.mutate(session_id, WizardState::try_advance).await
    }

    pub async fn back(&self, session_id: &str) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| {
            state.retreat();
            Ok(())
        })
        .await
    }

    pub async fn go_to(&self, session_id: &str, step: u8) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| state.go_to(step)).await
    }

    pub async fn set_thumbnail(
        &self,
        session_id: &str,
        settings: ThumbnailSettings,
        aspect_ratio: Option<f64>,
    ) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| state.set_thumbnail(settings, aspect_ratio))
            .await
    }

    /// Загрузить файл в слот. Превью строится вне блокировки сессии,
    /// поэтому несколько загрузок могут идти параллельно; детальные фото накапливаются.
    pub async fn attach_media(
        &self,
        session_id: &str,
        slot: MediaSlot,
        file: MediaFile,
    ) -> Result<WizardView, WizardError> {
        self.session(session_id)?;

        let preview = self.previews.to_preview(&file).await.map_err(|e| {
            tracing::warn!("Preview conversion failed for {}: {}", file.file_name, e);
            WizardError::InvalidMedia(e.to_string())
        })?;

        self.mutate(session_id, move |state| {
            state.attach_media(slot, MediaAttachment { file, preview });
            Ok(())
        })
        .await
    }

    pub async fn remove_media(
        &self,
        session_id: &str,
        slot: MediaSlot,
        index: Option<usize>,
    ) -> Result<WizardView, WizardError> {
        self.mutate(session_id, |state| state.remove_media(slot, index))
            .await
    }

    /// Сбросить форму и удалить сохраненный черновик
    pub async fn reset(&self, session_id: &str) -> Result<WizardView, WizardError> {
        let handle = self.session(session_id)?;
        let mut session = handle.lock().await;
        session.state.reset()?;

        if let Err(e) = self.drafts.clear(&session.draft_key).await {
            tracing::warn!("Failed to clear draft {}: {}", session.draft_key, e);
        }
        tracing::info!("Wizard session {} reset", session_id);
        Ok(session.state.view(session_id))
    }

    /// Отправить позицию. Пока отправка не завершилась, повторные вызовы отклоняются;
    /// черновик удаляется только после подтвержденного успеха.
    pub async fn submit(&self, session_id: &str) -> Result<SubmitResponse, WizardError> {
        let handle = self.session(session_id)?;

        let payload = {
            let mut session = handle.lock().await;
            session.state.begin_submit()?
        };

        let outcome = self
            .submitter
            .submit(payload)
            .await
            .map_err(|e| e.to_string());

        let mut session = handle.lock().await;
        match session.state.finish_submit(outcome) {
            Ok(item_id) => {
                if let Err(e) = self.drafts.clear(&session.draft_key).await {
                    tracing::warn!("Failed to clear draft {}: {}", session.draft_key, e);
                }
                tracing::info!("Wizard session {}: item created {:?}", session_id, item_id);
                Ok(SubmitResponse {
                    success: true,
                    item_id,
                    message: "Позиция создана".to_string(),
                })
            }
            Err(e) => {
                tracing::error!("Wizard session {}: submission failed: {}", session_id, e);
                Err(e)
            }
        }
    }
}
