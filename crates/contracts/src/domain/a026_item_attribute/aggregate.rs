use crate::domain::a025_item_category::{CategoryId, GrammaticalGender};
use crate::domain::common::AggregateId;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTypeId(pub Uuid);

impl AttributeTypeId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for AttributeTypeId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(AttributeTypeId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Well-known slots
// ============================================================================

/// Пять стандартных осей характеристик позиции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSlot {
    Brand,
    Quality,
    Material,
    Color,
    Size,
}

impl AttributeSlot {
    /// Порядок фрагментов в артикуле
    pub const SKU_ORDER: [AttributeSlot; 5] = [
        AttributeSlot::Brand,
        AttributeSlot::Quality,
        AttributeSlot::Material,
        AttributeSlot::Color,
        AttributeSlot::Size,
    ];

    /// Порядок слов в названии: материал идет раньше качества
    pub const NAME_ORDER: [AttributeSlot; 5] = [
        AttributeSlot::Brand,
        AttributeSlot::Material,
        AttributeSlot::Quality,
        AttributeSlot::Color,
        AttributeSlot::Size,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AttributeSlot::Brand => "brand",
            AttributeSlot::Quality => "quality",
            AttributeSlot::Material => "material",
            AttributeSlot::Color => "color",
            AttributeSlot::Size => "size",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::SKU_ORDER.into_iter().find(|s| s.slug() == slug)
    }

    pub fn is_well_known(slug: &str) -> bool {
        Self::from_slug(slug).is_some()
    }
}

// ============================================================================
// AttributeType
// ============================================================================

/// Тип характеристики (бренд, цвет, состав, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeType {
    pub id: AttributeTypeId,

    pub slug: String,

    pub name: String,

    /// Если задано, тип доступен только в этой категории/подкатегории
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<CategoryId>,

    #[serde(rename = "showInSku", default = "default_true")]
    pub show_in_sku: bool,

    #[serde(rename = "showInName", default = "default_true")]
    pub show_in_name: bool,
}

fn default_true() -> bool {
    true
}

impl AttributeType {
    pub fn is_well_known(&self) -> bool {
        AttributeSlot::is_well_known(&self.slug)
    }

    pub fn is_global(&self) -> bool {
        self.category_id.is_none()
    }

    /// Тип применим к выбранной категории или подкатегории
    pub fn applies_to(&self, category: Option<CategoryId>, subcategory: Option<CategoryId>) -> bool {
        match self.category_id {
            None => true,
            Some(scope) => Some(scope) == category || Some(scope) == subcategory,
        }
    }
}

// ============================================================================
// AttributeValue
// ============================================================================

/// Настройки значения характеристики
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMeta {
    #[serde(rename = "showInSku", default, skip_serializing_if = "Option::is_none")]
    pub show_in_sku: Option<bool>,

    #[serde(rename = "showInName", default, skip_serializing_if = "Option::is_none")]
    pub show_in_name: Option<bool>,

    /// Форма для категорий женского рода
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fem: Option<String>,

    /// Форма для категорий среднего рода
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neut: Option<String>,

    /// Цвет для отображения образца (только для цветов)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

impl AttributeMeta {
    pub fn shows_in_sku(&self) -> bool {
        self.show_in_sku.unwrap_or(true)
    }

    pub fn shows_in_name(&self) -> bool {
        self.show_in_name.unwrap_or(true)
    }
}

/// Значение характеристики из справочника
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// slug типа характеристики
    #[serde(rename = "type")]
    pub attribute_type: String,

    pub code: String,

    pub name: String,

    #[serde(default, deserialize_with = "deserialize_meta")]
    pub meta: AttributeMeta,
}

impl AttributeValue {
    pub fn new(attribute_type: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            code: code.into(),
            name: name.into(),
            meta: AttributeMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: AttributeMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Название с учетом рода категории; при отсутствии формы используется базовое имя
    pub fn name_for(&self, gender: GrammaticalGender) -> &str {
        let variant = match gender {
            GrammaticalGender::Feminine => self.meta.fem.as_deref(),
            GrammaticalGender::Neuter => self.meta.neut.as_deref(),
            GrammaticalGender::Masculine => None,
        };
        variant
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.name)
    }
}

/// meta приходит объектом, JSON-строкой или null; нечитаемое значение дает настройки по умолчанию
fn deserialize_meta<'de, D>(deserializer: D) -> Result<AttributeMeta, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(encoded)) => {
            serde_json::from_str(&encoded).unwrap_or_default()
        }
        Some(value @ serde_json::Value::Object(_)) => {
            serde_json::from_value(value).unwrap_or_default()
        }
        _ => AttributeMeta::default(),
    })
}
