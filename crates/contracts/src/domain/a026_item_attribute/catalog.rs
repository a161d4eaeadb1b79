use super::aggregate::{AttributeSlot, AttributeType, AttributeValue};
use crate::domain::a025_item_category::CategoryId;
use serde::{Deserialize, Serialize};

/// Справочник характеристик: типы и значения, только на чтение
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeCatalog {
    #[serde(default)]
    types: Vec<AttributeType>,

    #[serde(default)]
    values: Vec<AttributeValue>,
}

impl AttributeCatalog {
    pub fn new(types: Vec<AttributeType>, values: Vec<AttributeValue>) -> Self {
        Self { types, values }
    }

    pub fn types(&self) -> &[AttributeType] {
        &self.types
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    pub fn find_type(&self, slug: &str) -> Option<&AttributeType> {
        self.types.iter().find(|t| t.slug == slug)
    }

    /// Найти значение по паре (slug типа, код)
    pub fn find_value(&self, slug: &str, code: &str) -> Option<&AttributeValue> {
        self.values
            .iter()
            .find(|v| v.attribute_type == slug && v.code == code)
    }

    pub fn find_slot_value(&self, slot: AttributeSlot, code: &str) -> Option<&AttributeValue> {
        self.find_value(slot.slug(), code)
    }

    pub fn values_of<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a AttributeValue> + 'a {
        self.values.iter().filter(move |v| v.attribute_type == slug)
    }

    /// Пользовательские типы, применимые к категории, в порядке справочника
    pub fn custom_types_for(
        &self,
        category: Option<CategoryId>,
        subcategory: Option<CategoryId>,
    ) -> impl Iterator<Item = &AttributeType> {
        self.types
            .iter()
            .filter(move |t| !t.is_well_known() && t.applies_to(category, subcategory))
    }

    /// Известен ли slug как пользовательский тип характеристики
    pub fn is_custom_slug(&self, slug: &str) -> bool {
        self.find_type(slug).map_or(false, |t| !t.is_well_known())
    }

    /// Учитывать ли тип в артикуле (тип без записи в справочнике не скрывается)
    pub fn type_shows_in_sku(&self, slug: &str) -> bool {
        self.find_type(slug).map_or(true, |t| t.show_in_sku)
    }

    pub fn type_shows_in_name(&self, slug: &str) -> bool {
        self.find_type(slug).map_or(true, |t| t.show_in_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a026_item_attribute::aggregate::AttributeTypeId;
    use uuid::Uuid;

    fn attr_type(n: u128, slug: &str, scope: Option<u128>) -> AttributeType {
        AttributeType {
            id: AttributeTypeId::new(Uuid::from_u128(n)),
            slug: slug.into(),
            name: slug.into(),
            category_id: scope.map(|s| CategoryId::new(Uuid::from_u128(s))),
            show_in_sku: true,
            show_in_name: true,
        }
    }

    #[test]
    fn test_custom_types_skip_well_known_and_foreign_scopes() {
        let catalog = AttributeCatalog::new(
            vec![
                attr_type(1, "brand", None),
                attr_type(2, "density", None),
                attr_type(3, "print", Some(10)),
                attr_type(4, "lining", Some(20)),
            ],
            vec![],
        );
        let category = Some(CategoryId::new(Uuid::from_u128(1)));
        let sub = Some(CategoryId::new(Uuid::from_u128(10)));

        let slugs: Vec<&str> = catalog
            .custom_types_for(category, sub)
            .map(|t| t.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["density", "print"]);

        assert!(catalog.is_custom_slug("lining"));
        assert!(!catalog.is_custom_slug("brand"));
        assert!(!catalog.is_custom_slug("unknown"));
    }

    #[test]
    fn test_find_value_matches_type_and_code() {
        let catalog = AttributeCatalog::new(
            vec![],
            vec![
                AttributeValue::new("size", "L", "L"),
                AttributeValue::new("brand", "L", "Lacoste"),
            ],
        );
        assert_eq!(
            catalog.find_value("brand", "L").map(|v| v.name.as_str()),
            Some("Lacoste")
        );
        assert!(catalog.find_slot_value(AttributeSlot::Color, "L").is_none());
        assert_eq!(catalog.values_of("size").count(), 1);
    }
}
