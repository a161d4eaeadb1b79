use super::media::{MediaSlots, ThumbnailSettings};
use super::packaging::{normalize_features, PackagingFeature, PackagingType};
use crate::domain::a025_item_category::{CategoryId, DEFAULT_UNIT};
use crate::domain::a026_item_attribute::AttributeSlot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Последние сгенерированные артикул и название
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIdentity {
    pub sku: String,

    #[serde(rename = "name")]
    pub display_name: String,
}

/// Черновик новой позиции, которым владеет мастер создания
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDraft {
    #[serde(rename = "subcategoryId")]
    pub subcategory_id: Option<CategoryId>,

    // Коды стандартных характеристик
    #[serde(rename = "brandCode")]
    pub brand_code: Option<String>,
    #[serde(rename = "qualityCode")]
    pub quality_code: Option<String>,
    #[serde(rename = "materialCode")]
    pub material_code: Option<String>,
    #[serde(rename = "attributeCode")]
    pub color_code: Option<String>,
    #[serde(rename = "sizeCode")]
    pub size_code: Option<String>,

    /// Коды пользовательских характеристик по slug типа
    pub attributes: BTreeMap<String, String>,

    #[serde(rename = "itemName")]
    pub item_name: String,
    pub sku: String,
    pub unit: String,
    pub description: String,

    // Габариты и подразделение
    pub width: String,
    pub height: String,
    pub depth: String,
    pub weight: String,
    pub department: String,

    #[serde(rename = "costPrice")]
    pub cost_price: String,
    #[serde(rename = "sellingPrice")]
    pub selling_price: String,

    // Складские поля
    #[serde(rename = "storageLocationId")]
    pub storage_location_id: Option<String>,
    pub quantity: String,
    #[serde(rename = "lowStockThreshold")]
    pub low_stock_threshold: String,
    #[serde(rename = "criticalStockThreshold")]
    pub critical_stock_threshold: String,

    // Упаковка
    #[serde(rename = "packagingType")]
    pub packaging_type: Option<PackagingType>,
    #[serde(rename = "supplierName")]
    pub supplier_name: String,
    #[serde(rename = "supplierLink")]
    pub supplier_link: String,
    #[serde(rename = "minBatch")]
    pub min_batch: String,
    pub features: Vec<PackagingFeature>,

    #[serde(rename = "thumbSettings")]
    pub thumb_settings: ThumbnailSettings,

    pub generated: Option<GeneratedIdentity>,

    #[serde(rename = "userEditedName")]
    pub user_edited_name: bool,
    #[serde(rename = "userEditedSku")]
    pub user_edited_sku: bool,

    #[serde(skip)]
    pub media: MediaSlots,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            subcategory_id: None,
            brand_code: None,
            quality_code: None,
            material_code: None,
            color_code: None,
            size_code: None,
            attributes: BTreeMap::new(),
            item_name: String::new(),
            sku: String::new(),
            unit: DEFAULT_UNIT.to_string(),
            description: String::new(),
            width: String::new(),
            height: String::new(),
            depth: String::new(),
            weight: String::new(),
            department: String::new(),
            cost_price: String::new(),
            selling_price: String::new(),
            storage_location_id: None,
            quantity: String::new(),
            low_stock_threshold: String::new(),
            critical_stock_threshold: String::new(),
            packaging_type: None,
            supplier_name: String::new(),
            supplier_link: String::new(),
            min_batch: String::new(),
            features: Vec::new(),
            thumb_settings: ThumbnailSettings::default(),
            generated: None,
            user_edited_name: false,
            user_edited_sku: false,
            media: MediaSlots::default(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ItemDraft {
    pub fn code(&self, slot: AttributeSlot) -> Option<&str> {
        let code = match slot {
            AttributeSlot::Brand => &self.brand_code,
            AttributeSlot::Quality => &self.quality_code,
            AttributeSlot::Material => &self.material_code,
            AttributeSlot::Color => &self.color_code,
            AttributeSlot::Size => &self.size_code,
        };
        code.as_deref().filter(|c| !c.is_empty())
    }

    pub fn set_code(&mut self, slot: AttributeSlot, code: Option<String>) {
        let code = code.and_then(non_empty);
        match slot {
            AttributeSlot::Brand => self.brand_code = code,
            AttributeSlot::Quality => self.quality_code = code,
            AttributeSlot::Material => self.material_code = code,
            AttributeSlot::Color => self.color_code = code,
            AttributeSlot::Size => self.size_code = code,
        }
    }

    pub fn custom_code(&self, slug: &str) -> Option<&str> {
        self.attributes
            .get(slug)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    pub fn clear_codes(&mut self) {
        for slot in AttributeSlot::SKU_ORDER {
            self.set_code(slot, None);
        }
        self.attributes.clear();
    }

    /// Слить частичное обновление. Пустая строка в коде или характеристике очищает значение.
    /// Отслеживание ручных правок и перегенерация выполняются владельцем черновика.
    pub fn apply(&mut self, patch: ItemDraftPatch) {
        if patch.clear_subcategory {
            self.subcategory_id = None;
        }
        if let Some(id) = patch.subcategory_id {
            self.subcategory_id = Some(id);
        }

        let codes = [
            (AttributeSlot::Brand, patch.brand_code),
            (AttributeSlot::Quality, patch.quality_code),
            (AttributeSlot::Material, patch.material_code),
            (AttributeSlot::Color, patch.color_code),
            (AttributeSlot::Size, patch.size_code),
        ];
        for (slot, code) in codes {
            if let Some(code) = code {
                self.set_code(slot, Some(code));
            }
        }

        if let Some(attributes) = patch.attributes {
            for (slug, code) in attributes {
                match non_empty(code) {
                    Some(code) => {
                        self.attributes.insert(slug, code);
                    }
                    None => {
                        self.attributes.remove(&slug);
                    }
                }
            }
        }

        let text_fields = [
            (&mut self.item_name, patch.item_name),
            (&mut self.sku, patch.sku),
            (&mut self.unit, patch.unit),
            (&mut self.description, patch.description),
            (&mut self.width, patch.width),
            (&mut self.height, patch.height),
            (&mut self.depth, patch.depth),
            (&mut self.weight, patch.weight),
            (&mut self.department, patch.department),
            (&mut self.cost_price, patch.cost_price),
            (&mut self.selling_price, patch.selling_price),
            (&mut self.quantity, patch.quantity),
            (&mut self.low_stock_threshold, patch.low_stock_threshold),
            (&mut self.critical_stock_threshold, patch.critical_stock_threshold),
            (&mut self.supplier_name, patch.supplier_name),
            (&mut self.supplier_link, patch.supplier_link),
            (&mut self.min_batch, patch.min_batch),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(location) = patch.storage_location_id {
            self.storage_location_id = non_empty(location);
        }
        if let Some(settings) = patch.thumb_settings {
            self.thumb_settings = settings;
        }
        if let Some(packaging_type) = patch.packaging_type {
            self.packaging_type = Some(packaging_type);
        }
        if let Some(features) = patch.features {
            self.features = normalize_features(features);
        }
    }

    /// Копия без вложений: файлы и превью не переживают сериализацию
    pub fn without_media(&self) -> Self {
        Self {
            media: MediaSlots::default(),
            ..self.clone()
        }
    }
}

/// Частичное обновление черновика (updateFormData)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDraftPatch {
    #[serde(rename = "subcategoryId", skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<CategoryId>,
    /// Снять выбор подкатегории; `subcategoryId` в том же обновлении имеет приоритет
    #[serde(rename = "clearSubcategory", skip_serializing_if = "std::ops::Not::not")]
    pub clear_subcategory: bool,

    #[serde(rename = "brandCode", skip_serializing_if = "Option::is_none")]
    pub brand_code: Option<String>,
    #[serde(rename = "qualityCode", skip_serializing_if = "Option::is_none")]
    pub quality_code: Option<String>,
    #[serde(rename = "materialCode", skip_serializing_if = "Option::is_none")]
    pub material_code: Option<String>,
    #[serde(rename = "attributeCode", skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,
    #[serde(rename = "sizeCode", skip_serializing_if = "Option::is_none")]
    pub size_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,

    #[serde(rename = "itemName", skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(rename = "costPrice", skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<String>,
    #[serde(rename = "sellingPrice", skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<String>,

    #[serde(rename = "storageLocationId", skip_serializing_if = "Option::is_none")]
    pub storage_location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(rename = "lowStockThreshold", skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<String>,
    #[serde(rename = "criticalStockThreshold", skip_serializing_if = "Option::is_none")]
    pub critical_stock_threshold: Option<String>,

    #[serde(rename = "packagingType", skip_serializing_if = "Option::is_none")]
    pub packaging_type: Option<PackagingType>,
    #[serde(rename = "supplierName", skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(rename = "supplierLink", skip_serializing_if = "Option::is_none")]
    pub supplier_link: Option<String>,
    #[serde(rename = "minBatch", skip_serializing_if = "Option::is_none")]
    pub min_batch: Option<String>,
    /// Полный список особенностей; заменяет текущий
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<PackagingFeature>>,

    #[serde(rename = "thumbSettings", skip_serializing_if = "Option::is_none")]
    pub thumb_settings: Option<ThumbnailSettings>,
}

impl ItemDraftPatch {
    pub fn code(slot: AttributeSlot, code: impl Into<String>) -> Self {
        let code = Some(code.into());
        match slot {
            AttributeSlot::Brand => Self { brand_code: code, ..Default::default() },
            AttributeSlot::Quality => Self { quality_code: code, ..Default::default() },
            AttributeSlot::Material => Self { material_code: code, ..Default::default() },
            AttributeSlot::Color => Self { color_code: code, ..Default::default() },
            AttributeSlot::Size => Self { size_code: code, ..Default::default() },
        }
    }

    pub fn attribute(slug: impl Into<String>, code: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(slug.into(), code.into());
        Self {
            attributes: Some(attributes),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Черновик в локальном хранилище
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    #[serde(rename = "formData")]
    pub form_data: ItemDraft,

    #[serde(default)]
    pub step: u8,

    #[serde(rename = "selectedCategoryId", default)]
    pub selected_category_id: Option<CategoryId>,

    #[serde(rename = "savedAt", default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}
