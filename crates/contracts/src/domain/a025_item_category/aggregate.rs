use crate::domain::common::AggregateId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Единица измерения по умолчанию для новых позиций
pub const DEFAULT_UNIT: &str = "шт.";

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for CategoryId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(CategoryId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Грамматический род категории: определяет форму прилагательных в названии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammaticalGender {
    #[default]
    Masculine,
    Feminine,
    Neuter,
}

/// Тип позиции, передаваемый при создании (поле `itemType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Clothing,
    Packaging,
    Consumables,
    #[default]
    General,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Clothing => "clothing",
            ItemKind::Packaging => "packaging",
            ItemKind::Consumables => "consumables",
            ItemKind::General => "general",
        }
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Категория склада (дерево глубиной в один уровень подкатегорий)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    #[serde(rename = "parentId", default)]
    pub parent_id: Option<CategoryId>,

    /// Префикс артикула
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub gender: GrammaticalGender,

    /// Название в единственном числе ("Футболка" для "Футболки")
    #[serde(rename = "singularName", default)]
    pub singular_name: Option<String>,

    #[serde(rename = "itemKind", default)]
    pub item_kind: ItemKind,

    /// Категория поддерживает автоматическую генерацию артикула и названия
    #[serde(rename = "supportsAutoNaming", default)]
    pub supports_auto_naming: bool,

    #[serde(rename = "showInSku", default = "default_true")]
    pub show_in_sku: bool,

    #[serde(rename = "showInName", default = "default_true")]
    pub show_in_name: bool,

    #[serde(rename = "defaultUnit", default)]
    pub default_unit: Option<String>,

    #[serde(rename = "sortOrder", default)]
    pub sort_order: i32,
}

fn default_true() -> bool {
    true
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            prefix: None,
            gender: GrammaticalGender::default(),
            singular_name: None,
            item_kind: ItemKind::default(),
            supports_auto_naming: false,
            show_in_sku: true,
            show_in_name: true,
            default_unit: None,
            sort_order: 0,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_child_of(&self, parent: CategoryId) -> bool {
        self.parent_id == Some(parent)
    }

    /// Префикс, который попадает в артикул (с учетом флага видимости)
    pub fn sku_prefix(&self) -> Option<&str> {
        if !self.show_in_sku {
            return None;
        }
        self.prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Базовое существительное для названия позиции
    pub fn base_noun(&self) -> Option<&str> {
        if !self.show_in_name {
            return None;
        }
        let noun = self
            .singular_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.name.trim());
        if noun.is_empty() {
            None
        } else {
            Some(noun)
        }
    }

    pub fn unit_default(&self) -> Option<&str> {
        self.default_unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Название категории не может быть пустым".into());
        }
        if self.parent_id == Some(self.id) {
            return Err("Категория не может быть родителем самой себя".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_deserializes_with_defaults() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Футболки"}"#;
        let category: Category = serde_json::from_str(json).unwrap();

        assert!(category.is_top_level());
        assert_eq!(category.gender, GrammaticalGender::Masculine);
        assert_eq!(category.item_kind, ItemKind::General);
        assert!(category.show_in_sku);
        assert!(category.show_in_name);
        assert!(!category.supports_auto_naming);
    }

    #[test]
    fn test_base_noun_prefers_singular_name() {
        let mut category = Category::new(CategoryId::new(Uuid::from_u128(1)), "Футболки");
        assert_eq!(category.base_noun(), Some("Футболки"));

        category.singular_name = Some("Футболка".into());
        assert_eq!(category.base_noun(), Some("Футболка"));

        category.show_in_name = false;
        assert_eq!(category.base_noun(), None);
    }

    #[test]
    fn test_sku_prefix_respects_visibility() {
        let mut category = Category::new(CategoryId::new(Uuid::from_u128(1)), "Худи");
        assert_eq!(category.sku_prefix(), None);

        category.prefix = Some(" HD ".into());
        assert_eq!(category.sku_prefix(), Some("HD"));

        category.show_in_sku = false;
        assert_eq!(category.sku_prefix(), None);
    }

    #[test]
    fn test_validate_rejects_self_parent() {
        let id = CategoryId::new(Uuid::from_u128(3));
        let mut category = Category::new(id, "Кепки");
        assert!(category.validate().is_ok());

        category.parent_id = Some(id);
        assert!(category.validate().is_err());
    }
}
