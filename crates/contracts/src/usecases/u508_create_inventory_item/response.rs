use crate::domain::a025_item_category::CategoryId;
use crate::domain::a027_inventory_item::{ItemDraft, MediaSummary};
use serde::{Deserialize, Serialize};

/// Откуда мастер получил начальное состояние
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitSource {
    /// Категория выбрана по ссылке
    DeepLinked,
    /// Продолжение сохраненного черновика
    Restored,
    /// Пустая форма
    Fresh,
}

/// Состояние мастера для клиента
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardView {
    #[serde(rename = "sessionId")]
    pub session_id: String,

    pub step: u8,

    #[serde(rename = "selectedCategoryId")]
    pub selected_category_id: Option<CategoryId>,

    pub draft: ItemDraft,

    pub media: MediaSummary,

    #[serde(rename = "validationError")]
    pub validation_error: Option<String>,

    #[serde(rename = "isSubmitting")]
    pub is_submitting: bool,

    #[serde(rename = "canAdvance")]
    pub can_advance: bool,

    #[serde(rename = "autoNaming")]
    pub auto_naming: bool,

    #[serde(rename = "initSource")]
    pub init_source: InitSource,
}

/// Результат отправки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,

    #[serde(rename = "itemId")]
    pub item_id: Option<String>,

    pub message: String,
}
