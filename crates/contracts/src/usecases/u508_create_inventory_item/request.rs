use crate::domain::a025_item_category::CategoryId;
use crate::domain::a027_inventory_item::ThumbnailSettings;
use serde::{Deserialize, Serialize};

/// Запуск мастера. Параметры deep-link читаются один раз при старте.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartWizardRequest {
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<String>,

    #[serde(rename = "subcategoryId", default)]
    pub subcategory_id: Option<String>,

    /// Ключ черновика (вкладка, пользователь); по умолчанию общий
    #[serde(rename = "draftKey", default)]
    pub draft_key: Option<String>,
}

impl StartWizardRequest {
    pub fn has_deep_link(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.trim().is_empty());
        present(&self.category_id) || present(&self.subcategory_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectCategoryRequest {
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectSubcategoryRequest {
    #[serde(rename = "subcategoryId")]
    pub subcategory_id: CategoryId,
}

/// Переход по боковой панели
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoToStepRequest {
    pub step: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    #[serde(flatten)]
    pub settings: ThumbnailSettings,

    /// Соотношение сторон основного фото; если задано, смещение ограничивается
    #[serde(rename = "aspectRatio", default)]
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveMediaQuery {
    #[serde(default)]
    pub index: Option<usize>,
}
