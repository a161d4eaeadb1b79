use super::step_gate::{self, GateContext};
use crate::shared::catalog::CatalogSnapshot;
use contracts::domain::a025_item_category::{Category, CategoryId, DeepLinkTarget, DEFAULT_UNIT};
use contracts::domain::a026_item_attribute::AttributeCatalog;
use contracts::domain::a027_inventory_item::{
    DraftSnapshot, GeneratedIdentity, ItemDraft, ItemDraftPatch, MediaAttachment, MediaSlot,
    SubmissionPayload, SubmissionResult, ThumbnailSettings,
};
use contracts::shared::item_naming::{self, NamingInput, SelectedCodes};
use contracts::usecases::u508_create_inventory_item::{InitSource, WizardView};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Ошибки мастера создания позиции
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("Subcategory {0} does not belong to the selected category")]
    InvalidSubcategory(CategoryId),

    #[error("Category is not selected")]
    CategoryNotSelected,

    #[error("Unknown attribute type: {0}")]
    UnknownAttribute(String),

    #[error("Invalid step: {0}")]
    InvalidStep(u8),

    #[error("Media slot is empty: {0}")]
    MediaNotFound(String),

    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    #[error("{0}")]
    Validation(String),

    #[error("Submission already in progress")]
    SubmissionInProgress,

    #[error("Item already submitted")]
    AlreadySubmitted,

    #[error("{0}")]
    SubmissionFailed(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

/// Шаги мастера
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    CategorySelect = 0,
    AttributeEntry = 1,
    MediaEntry = 2,
    StockEntry = 3,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::CategorySelect,
        WizardStep::AttributeEntry,
        WizardStep::MediaEntry,
        WizardStep::StockEntry,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Шаг из сохраненного значения, ограниченный допустимым диапазоном
    pub fn clamped(index: u8) -> Self {
        Self::from_index(index.min(WizardStep::StockEntry.index())).unwrap_or_default()
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }

    pub fn prev(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(self)
    }
}

/// Как была выполнена однократная инициализация
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitState {
    #[default]
    NotStarted,
    DeepLinked,
    /// `resumed` - найден ли сохраненный черновик
    Restored { resumed: bool },
}

impl InitState {
    pub fn source(self) -> InitSource {
        match self {
            InitState::DeepLinked => InitSource::DeepLinked,
            InitState::Restored { resumed: true } => InitSource::Restored,
            _ => InitSource::Fresh,
        }
    }
}

fn is_override(value: &str, generated: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != generated.trim()
}

/// Оставить только пользовательские характеристики, применимые к категории
fn retain_applicable(
    attributes: &mut BTreeMap<String, String>,
    catalog: &AttributeCatalog,
    category: Option<CategoryId>,
    subcategory: Option<CategoryId>,
) {
    attributes.retain(|slug, _| {
        catalog
            .custom_types_for(category, subcategory)
            .any(|t| &t.slug == slug)
    });
}

/// Состояние мастера: шаг, выбранная категория и черновик позиции
#[derive(Debug)]
pub struct WizardState {
    catalog: Arc<CatalogSnapshot>,
    step: WizardStep,
    selected_category: Option<CategoryId>,
    draft: ItemDraft,
    validation_error: Option<String>,
    init: InitState,
    is_submitting: bool,
    submitted: bool,
    created_item_id: Option<String>,
}

impl WizardState {
    pub fn new(catalog: Arc<CatalogSnapshot>) -> Self {
        Self {
            catalog,
            step: WizardStep::CategorySelect,
            selected_category: None,
            draft: ItemDraft::default(),
            validation_error: None,
            init: InitState::NotStarted,
            is_submitting: false,
            submitted: false,
            created_item_id: None,
        }
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub fn init_state(&self) -> InitState {
        self.init
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.selected_category
            .and_then(|id| self.catalog.categories.find(id))
    }

    fn valid_subcategory(&self) -> Option<&Category> {
        let category = self.selected_category?;
        self.catalog
            .categories
            .valid_subcategory(category, self.draft.subcategory_id)
    }

    /// Единица измерения по умолчанию для текущего выбора
    fn default_unit(&self) -> String {
        self.valid_subcategory()
            .and_then(|s| s.unit_default())
            .or_else(|| self.selected_category().and_then(|c| c.unit_default()))
            .unwrap_or(DEFAULT_UNIT)
            .to_string()
    }

    /// Артикул и название генерируются автоматически
    pub fn auto_naming(&self) -> bool {
        self.selected_category()
            .map_or(false, |c| c.supports_auto_naming)
            || self
                .valid_subcategory()
                .map_or(false, |s| s.supports_auto_naming)
    }

    // ------------------------------------------------------------------------
    // Инициализация
    // ------------------------------------------------------------------------

    /// Выбрать категорию по ссылке. Ссылка имеет приоритет и над уже примененным черновиком.
    pub fn initialize_from_deep_link(&mut self, target: DeepLinkTarget) -> Result<bool, WizardError> {
        if self.init == InitState::DeepLinked {
            return Ok(false);
        }

        let catalog = Arc::clone(&self.catalog);
        let category = catalog
            .categories
            .find(target.category_id)
            .filter(|c| c.is_top_level())
            .ok_or(WizardError::UnknownCategory(target.category_id))?;

        self.clear_form();
        self.apply_category(category);

        if let Some(sub) = catalog
            .categories
            .valid_subcategory(category.id, target.subcategory_id)
        {
            self.draft.subcategory_id = Some(sub.id);
            if let Some(unit) = sub.unit_default() {
                self.draft.unit = unit.to_string();
            }
        }

        if !catalog.categories.has_children(category.id) || self.draft.subcategory_id.is_some() {
            self.step = WizardStep::AttributeEntry;
        }

        self.init = InitState::DeepLinked;
        self.regenerate();
        Ok(true)
    }

    /// Применить восстановленный черновик; срабатывает только до любой другой инициализации
    pub fn apply_restored(&mut self, snapshot: Option<DraftSnapshot>) -> bool {
        if self.init != InitState::NotStarted {
            tracing::debug!("Draft restoration skipped: wizard already initialized ({:?})", self.init);
            return false;
        }

        let Some(snapshot) = snapshot else {
            self.init = InitState::Restored { resumed: false };
            return true;
        };

        let catalog = Arc::clone(&self.catalog);
        let mut draft = snapshot.form_data;
        let category = snapshot
            .selected_category_id
            .and_then(|id| catalog.categories.find(id))
            .filter(|c| c.is_top_level());

        let step = match category {
            Some(category) => {
                if catalog
                    .categories
                    .valid_subcategory(category.id, draft.subcategory_id)
                    .is_none()
                {
                    draft.subcategory_id = None;
                }
                WizardStep::clamped(snapshot.step)
            }
            None => {
                draft.subcategory_id = None;
                WizardStep::CategorySelect
            }
        };

        retain_applicable(
            &mut draft.attributes,
            &catalog.attributes,
            category.map(|c| c.id),
            draft.subcategory_id,
        );

        self.selected_category = category.map(|c| c.id);
        self.draft = draft;
        self.step = step;
        self.validation_error = None;
        self.init = InitState::Restored { resumed: true };
        self.regenerate();
        true
    }

    // ------------------------------------------------------------------------
    // Изменения черновика
    // ------------------------------------------------------------------------

    fn clear_form(&mut self) {
        self.step = WizardStep::CategorySelect;
        self.selected_category = None;
        self.draft = ItemDraft::default();
        self.validation_error = None;
    }

    fn apply_category(&mut self, category: &Category) {
        self.selected_category = Some(category.id);
        self.draft.subcategory_id = None;
        self.draft.clear_codes();
        self.draft.item_name.clear();
        self.draft.sku.clear();
        self.draft.generated = None;
        self.draft.user_edited_name = false;
        self.draft.user_edited_sku = false;
        self.draft.unit = category.unit_default().unwrap_or(DEFAULT_UNIT).to_string();
    }

    /// Выбор категории верхнего уровня сбрасывает подкатегорию, коды, название и артикул
    pub fn select_category(&mut self, id: CategoryId) -> Result<(), WizardError> {
        let catalog = Arc::clone(&self.catalog);
        let category = catalog
            .categories
            .find(id)
            .filter(|c| c.is_top_level())
            .ok_or(WizardError::UnknownCategory(id))?;

        self.apply_category(category);
        self.validation_error = None;
        self.regenerate();
        Ok(())
    }

    pub fn select_subcategory(&mut self, id: CategoryId) -> Result<(), WizardError> {
        self.update_form_data(ItemDraftPatch {
            subcategory_id: Some(id),
            ..Default::default()
        })
    }

    /// Единая точка изменения черновика: слияние, сброс ошибки шага и перегенерация
    pub fn update_form_data(&mut self, patch: ItemDraftPatch) -> Result<(), WizardError> {
        let catalog = Arc::clone(&self.catalog);

        let subcategory = match patch.subcategory_id {
            Some(sub_id) => {
                let category = self
                    .selected_category
                    .ok_or(WizardError::CategoryNotSelected)?;
                let sub = catalog
                    .categories
                    .valid_subcategory(category, Some(sub_id))
                    .ok_or(WizardError::InvalidSubcategory(sub_id))?;
                Some(sub)
            }
            None => None,
        };

        let scope = subcategory.map(|s| s.id).or(self.draft.subcategory_id);
        if let Some(attributes) = &patch.attributes {
            for slug in attributes.keys() {
                let applicable = catalog
                    .attributes
                    .custom_types_for(self.selected_category, scope)
                    .any(|t| &t.slug == slug);
                if !applicable {
                    return Err(WizardError::UnknownAttribute(slug.clone()));
                }
            }
        }

        let edited_name = patch.item_name.clone();
        let edited_sku = patch.sku.clone();
        let sets_unit = patch.unit.is_some();
        let changes_subcategory = subcategory.is_some() || patch.clear_subcategory;
        let previous_default = self.default_unit();

        self.draft.apply(patch);

        if changes_subcategory {
            retain_applicable(
                &mut self.draft.attributes,
                &catalog.attributes,
                self.selected_category,
                self.draft.subcategory_id,
            );
            // единица, введенная вручную, не заменяется умолчанием
            let unit = self.draft.unit.trim();
            if !sets_unit && (unit.is_empty() || unit == previous_default) {
                self.draft.unit = self.default_unit();
            }
        }

        let generated = self.draft.generated.clone().unwrap_or_default();
        if let Some(name) = edited_name {
            self.draft.user_edited_name = is_override(&name, &generated.display_name);
        }
        if let Some(sku) = edited_sku {
            self.draft.user_edited_sku = is_override(&sku, &generated.sku);
        }

        self.validation_error = None;
        self.regenerate();
        Ok(())
    }

    /// Пересчитать артикул и название в том же изменении, что и правка полей.
    /// Поля с ручной правкой не перезаписываются.
    fn regenerate(&mut self) {
        if !self.auto_naming() {
            // без автогенерации прежние сгенерированные значения убираются
            if let Some(generated) = self.draft.generated.take() {
                if !self.draft.user_edited_sku && self.draft.sku == generated.sku {
                    self.draft.sku.clear();
                }
                if !self.draft.user_edited_name && self.draft.item_name == generated.display_name {
                    self.draft.item_name.clear();
                }
            }
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        let Some(category) = self
            .selected_category
            .and_then(|id| catalog.categories.find(id))
        else {
            return;
        };
        let subcategory = self
            .draft
            .subcategory_id
            .and_then(|id| catalog.categories.find(id));

        let derived = item_naming::derive(&NamingInput {
            category,
            subcategory,
            codes: SelectedCodes::from_draft(&self.draft),
            catalog: &catalog.attributes,
        });

        if !self.draft.user_edited_sku && self.draft.sku != derived.sku {
            self.draft.sku = derived.sku.clone();
        }
        if !self.draft.user_edited_name && self.draft.item_name != derived.display_name {
            self.draft.item_name = derived.display_name.clone();
        }
        self.draft.generated = Some(GeneratedIdentity {
            sku: derived.sku,
            display_name: derived.display_name,
        });
    }

    pub fn attach_media(&mut self, slot: MediaSlot, attachment: MediaAttachment) {
        self.draft.media.put(slot, attachment);
        self.validation_error = None;
    }

    pub fn remove_media(&mut self, slot: MediaSlot, index: Option<usize>) -> Result<(), WizardError> {
        if !self.draft.media.remove(slot, index) {
            return Err(WizardError::MediaNotFound(slot.field_name().to_string()));
        }
        self.validation_error = None;
        Ok(())
    }

    /// Настройки миниатюры; при известном соотношении сторон смещение ограничивается
    pub fn set_thumbnail(
        &mut self,
        settings: ThumbnailSettings,
        aspect_ratio: Option<f64>,
    ) -> Result<(), WizardError> {
        let settings = match aspect_ratio {
            Some(ratio) => settings.clamped(ratio),
            None => settings,
        };
        self.update_form_data(ItemDraftPatch {
            thumb_settings: Some(settings),
            ..Default::default()
        })
    }

    // ------------------------------------------------------------------------
    // Навигация
    // ------------------------------------------------------------------------

    fn gate_context(&self) -> GateContext<'_> {
        let category = self.selected_category();
        GateContext {
            draft: &self.draft,
            category,
            has_subcategories: category
                .map_or(false, |c| self.catalog.categories.has_children(c.id)),
            subcategory_valid: self.valid_subcategory().is_some(),
            auto_naming: self.auto_naming(),
        }
    }

    pub fn check_step(&self, step: WizardStep) -> Result<(), String> {
        step_gate::check(step, &self.gate_context())
    }

    pub fn can_advance(&self) -> bool {
        step_gate::can_advance(self.step, &self.gate_context())
    }

    /// Безусловный переход вперед; проверка выполняется снаружи
    pub fn advance(&mut self) {
        self.step = self.step.next();
    }

    pub fn retreat(&mut self) {
        self.step = self.step.prev();
        self.validation_error = None;
    }

    fn reject(&mut self, message: String) -> WizardError {
        self.validation_error = Some(message.clone());
        WizardError::Validation(message)
    }

    /// "Далее": проверка текущего шага, затем переход
    pub fn try_advance(&mut self) -> Result<(), WizardError> {
        if let Err(message) = self.check_step(self.step) {
            return Err(self.reject(message));
        }
        self.validation_error = None;
        self.advance();
        Ok(())
    }

    /// Переход по боковой панели. Назад - свободно; вперед - с проверкой каждого
    /// промежуточного шага, курсор останавливается на первом непройденном.
    pub fn go_to(&mut self, index: u8) -> Result<(), WizardError> {
        let target = WizardStep::from_index(index).ok_or(WizardError::InvalidStep(index))?;

        if target <= self.step {
            if target < self.step {
                self.step = target;
                self.validation_error = None;
            }
            return Ok(());
        }

        while self.step < target {
            if let Err(message) = self.check_step(self.step) {
                return Err(self.reject(message));
            }
            self.advance();
        }
        self.validation_error = None;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Отправка
    // ------------------------------------------------------------------------

    pub fn build_payload(&self) -> Result<SubmissionPayload, WizardError> {
        let category = self
            .selected_category()
            .ok_or(WizardError::CategoryNotSelected)?;
        let target = self.valid_subcategory().map_or(category.id, |s| s.id);
        Ok(SubmissionPayload::from_draft(
            &self.draft,
            target,
            category.item_kind,
        ))
    }

    /// Проверить все шаги, собрать форму и поднять флаг отправки.
    /// Повторный вызов до завершения отклоняется.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.is_submitting {
            return Err(WizardError::SubmissionInProgress);
        }

        for step in WizardStep::ALL {
            if let Err(message) = self.check_step(step) {
                return Err(self.reject(message));
            }
        }

        let payload = self.build_payload()?;
        self.is_submitting = true;
        self.validation_error = None;
        Ok(payload)
    }

    /// Завершить отправку. При ошибке черновик сохраняется, сообщение показывается как есть.
    pub fn finish_submit(
        &mut self,
        outcome: Result<SubmissionResult, String>,
    ) -> Result<Option<String>, WizardError> {
        self.is_submitting = false;

        let message = match outcome {
            Ok(result) if result.success => {
                self.submitted = true;
                self.created_item_id = result.data.map(|item| item.id);
                self.validation_error = None;
                return Ok(self.created_item_id.clone());
            }
            Ok(result) => result.error.unwrap_or_default(),
            Err(error) => error,
        };

        let message = if message.trim().is_empty() {
            "Произошла ошибка при создании позиции".to_string()
        } else {
            message
        };
        self.validation_error = Some(message.clone());
        Err(WizardError::SubmissionFailed(message))
    }

    /// Сбросить форму к пустому состоянию
    pub fn reset(&mut self) -> Result<(), WizardError> {
        if self.is_submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        self.clear_form();
        self.submitted = false;
        self.created_item_id = None;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Представления
    // ------------------------------------------------------------------------

    /// Черновик для хранилища (без файлов и превью)
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            form_data: self.draft.without_media(),
            step: self.step.index(),
            selected_category_id: self.selected_category,
            saved_at: chrono::Utc::now(),
        }
    }

    pub fn view(&self, session_id: &str) -> WizardView {
        WizardView {
            session_id: session_id.to_string(),
            step: self.step.index(),
            selected_category_id: self.selected_category,
            draft: self.draft.without_media(),
            media: self.draft.media.summary(),
            validation_error: self.validation_error.clone(),
            is_submitting: self.is_submitting,
            can_advance: self.can_advance(),
            auto_naming: self.auto_naming(),
            init_source: self.init.source(),
        }
    }
}
