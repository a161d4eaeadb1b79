//! Генерация артикула и названия позиции из категории и выбранных характеристик.
//!
//! Функция чистая: одинаковый вход всегда дает одинаковый результат, отсутствующие
//! в справочнике коды просто не участвуют в результате.

use crate::domain::a025_item_category::{Category, CategoryId, GrammaticalGender};
use crate::domain::a026_item_attribute::{AttributeCatalog, AttributeSlot, AttributeValue};
use crate::domain::a027_inventory_item::ItemDraft;
use crate::shared::transliteration::transliterate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Выбранные коды характеристик
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedCodes<'a> {
    pub brand: Option<&'a str>,
    pub quality: Option<&'a str>,
    pub material: Option<&'a str>,
    pub color: Option<&'a str>,
    pub size: Option<&'a str>,
    pub custom: Option<&'a BTreeMap<String, String>>,
}

impl<'a> SelectedCodes<'a> {
    pub fn from_draft(draft: &'a ItemDraft) -> Self {
        Self {
            brand: draft.code(AttributeSlot::Brand),
            quality: draft.code(AttributeSlot::Quality),
            material: draft.code(AttributeSlot::Material),
            color: draft.code(AttributeSlot::Color),
            size: draft.code(AttributeSlot::Size),
            custom: Some(&draft.attributes),
        }
    }

    pub fn slot(&self, slot: AttributeSlot) -> Option<&'a str> {
        let code = match slot {
            AttributeSlot::Brand => self.brand,
            AttributeSlot::Quality => self.quality,
            AttributeSlot::Material => self.material,
            AttributeSlot::Color => self.color,
            AttributeSlot::Size => self.size,
        };
        code.filter(|c| !c.is_empty())
    }

    pub fn custom(&self, slug: &str) -> Option<&'a str> {
        self.custom
            .and_then(|map| map.get(slug))
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }
}

/// Вход генератора
#[derive(Debug, Clone)]
pub struct NamingInput<'a> {
    /// Выбранная категория верхнего уровня
    pub category: &'a Category,
    /// Выбранная подкатегория (учитывается, только если принадлежит категории)
    pub subcategory: Option<&'a Category>,
    pub codes: SelectedCodes<'a>,
    pub catalog: &'a AttributeCatalog,
}

impl<'a> NamingInput<'a> {
    /// Категория, чьи prefix/gender/singularName используются
    pub fn effective_category(&self) -> &'a Category {
        self.subcategory
            .filter(|sub| sub.is_child_of(self.category.id))
            .unwrap_or(self.category)
    }

    fn valid_subcategory_id(&self) -> Option<CategoryId> {
        self.subcategory
            .filter(|sub| sub.is_child_of(self.category.id))
            .map(|sub| sub.id)
    }

    /// Пары (slug, значение) пользовательских характеристик в порядке справочника
    fn custom_values(&self) -> Vec<(&'a str, &'a AttributeValue)> {
        let catalog = self.catalog;
        catalog
            .custom_types_for(Some(self.category.id), self.valid_subcategory_id())
            .filter_map(|attr_type| {
                let code = self.codes.custom(&attr_type.slug)?;
                let value = catalog.find_value(&attr_type.slug, code)?;
                Some((attr_type.slug.as_str(), value))
            })
            .collect()
    }
}

/// Сгенерированные артикул и название
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedIdentity {
    pub sku: String,

    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Вычислить артикул и название
pub fn derive(input: &NamingInput<'_>) -> DerivedIdentity {
    DerivedIdentity {
        sku: derive_sku(input),
        display_name: derive_display_name(input),
    }
}

/// Артикул: префикс, затем коды бренд-качество-материал-цвет-размер и пользовательские коды,
/// через дефис, в верхнем регистре, транслитерированный
pub fn derive_sku(input: &NamingInput<'_>) -> String {
    let catalog = input.catalog;
    let mut parts: Vec<&str> = Vec::new();

    if let Some(prefix) = input.effective_category().sku_prefix() {
        parts.push(prefix);
    }

    for slot in AttributeSlot::SKU_ORDER {
        let Some(code) = input.codes.slot(slot) else {
            continue;
        };
        if !catalog.type_shows_in_sku(slot.slug()) {
            continue;
        }
        if let Some(value) = catalog.find_slot_value(slot, code) {
            if value.meta.shows_in_sku() {
                parts.push(&value.code);
            }
        }
    }

    for (slug, value) in input.custom_values() {
        if catalog.type_shows_in_sku(slug) && value.meta.shows_in_sku() {
            parts.push(&value.code);
        }
    }

    transliterate(&parts.join("-").to_uppercase())
}

/// Форма значения для названия или `None`, если тип или значение скрыты
fn visible_name<'v>(
    catalog: &AttributeCatalog,
    slug: &str,
    value: &'v AttributeValue,
    gender: GrammaticalGender,
) -> Option<&'v str> {
    if !catalog.type_shows_in_name(slug) || !value.meta.shows_in_name() {
        return None;
    }
    Some(value.name_for(gender))
}

/// Название: существительное категории, затем бренд-материал-качество-цвет-размер
/// и пользовательские характеристики в форме рода категории
pub fn derive_display_name(input: &NamingInput<'_>) -> String {
    let catalog = input.catalog;
    let effective = input.effective_category();
    let gender = effective.gender;
    let mut parts: Vec<&str> = Vec::new();

    if let Some(noun) = effective.base_noun() {
        parts.push(noun);
    }

    for slot in AttributeSlot::NAME_ORDER {
        let Some(code) = input.codes.slot(slot) else {
            continue;
        };
        if let Some(name) = catalog
            .find_slot_value(slot, code)
            .and_then(|value| visible_name(catalog, slot.slug(), value, gender))
        {
            parts.push(name);
        }
    }

    for (slug, value) in input.custom_values() {
        if let Some(name) = visible_name(catalog, slug, value, gender) {
            parts.push(name);
        }
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
