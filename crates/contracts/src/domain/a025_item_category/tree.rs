use super::aggregate::{Category, CategoryId};
use serde::{Deserialize, Serialize};

/// Результат разбора deep-link параметров
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkTarget {
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,

    #[serde(rename = "subcategoryId")]
    pub subcategory_id: Option<CategoryId>,
}

/// Дерево категорий, доступное мастеру только на чтение
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTree {
    categories: Vec<Category>,
}

impl CategoryTree {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn children(&self, parent: CategoryId) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.is_child_of(parent))
    }

    pub fn has_children(&self, parent: CategoryId) -> bool {
        self.children(parent).next().is_some()
    }

    /// Категории верхнего уровня в порядке отображения (sortOrder, затем имя)
    pub fn top_level(&self) -> Vec<&Category> {
        let mut top: Vec<&Category> = self.categories.iter().filter(|c| c.is_top_level()).collect();
        top.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        top
    }

    /// Подкатегория, если она действительно принадлежит выбранной категории
    pub fn valid_subcategory(
        &self,
        category: CategoryId,
        subcategory: Option<CategoryId>,
    ) -> Option<&Category> {
        subcategory
            .and_then(|id| self.find(id))
            .filter(|sub| sub.is_child_of(category))
    }

    /// Категория, чьи prefix/gender/singularName участвуют в генерации:
    /// корректная подкатегория, иначе сама категория
    pub fn effective(
        &self,
        category: CategoryId,
        subcategory: Option<CategoryId>,
    ) -> Option<&Category> {
        self.valid_subcategory(category, subcategory)
            .or_else(|| self.find(category))
    }

    /// Разобрать пару (категория, подкатегория) из внешней навигации.
    ///
    /// ID категории, указывающий на подкатегорию, поднимается до родителя;
    /// одна подкатегория определяет своего родителя; подкатегория чужого родителя отбрасывается.
    pub fn resolve_deep_link(
        &self,
        category_id: Option<CategoryId>,
        subcategory_id: Option<CategoryId>,
    ) -> Option<DeepLinkTarget> {
        let mut resolved_category = category_id;
        let mut resolved_sub = subcategory_id;

        if resolved_sub.is_none() {
            if let Some(cat) = resolved_category.and_then(|id| self.find(id)) {
                if let Some(parent) = cat.parent_id {
                    resolved_sub = Some(cat.id);
                    resolved_category = Some(parent);
                }
            }
        }

        if resolved_category.is_none() {
            resolved_category = resolved_sub
                .and_then(|id| self.find(id))
                .and_then(|sub| sub.parent_id);
        }

        let category = resolved_category
            .and_then(|id| self.find(id))
            .filter(|c| c.is_top_level())?;

        let subcategory_id = self
            .valid_subcategory(category.id, resolved_sub)
            .map(|sub| sub.id);

        Some(DeepLinkTarget {
            category_id: category.id,
            subcategory_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> CategoryId {
        CategoryId::new(Uuid::from_u128(n))
    }

    fn child(n: u128, parent: u128, name: &str) -> Category {
        let mut c = Category::new(id(n), name);
        c.parent_id = Some(id(parent));
        c
    }

    fn tree() -> CategoryTree {
        let mut packaging = Category::new(id(2), "Упаковка");
        packaging.sort_order = -1;
        CategoryTree::new(vec![
            Category::new(id(1), "Одежда"),
            packaging,
            Category::new(id(3), "Без категории"),
            child(10, 1, "Футболки"),
            child(11, 1, "Худи"),
        ])
    }

    #[test]
    fn test_top_level_sorted_by_order_then_name() {
        let tree = tree();
        let names: Vec<&str> = tree.top_level().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Упаковка", "Без категории", "Одежда"]);
    }

    #[test]
    fn test_effective_falls_back_for_foreign_subcategory() {
        let tree = tree();
        assert_eq!(tree.effective(id(1), Some(id(10))).map(|c| c.id), Some(id(10)));
        assert_eq!(tree.effective(id(2), Some(id(10))).map(|c| c.id), Some(id(2)));
        assert_eq!(tree.effective(id(1), Some(id(99))).map(|c| c.id), Some(id(1)));
    }

    #[test]
    fn test_deep_link_promotes_subcategory_passed_as_category() {
        let target = tree().resolve_deep_link(Some(id(11)), None).unwrap();
        assert_eq!(target.category_id, id(1));
        assert_eq!(target.subcategory_id, Some(id(11)));
    }

    #[test]
    fn test_deep_link_subcategory_alone_resolves_parent() {
        let target = tree().resolve_deep_link(None, Some(id(10))).unwrap();
        assert_eq!(target.category_id, id(1));
        assert_eq!(target.subcategory_id, Some(id(10)));
    }

    #[test]
    fn test_deep_link_drops_foreign_subcategory() {
        let target = tree().resolve_deep_link(Some(id(2)), Some(id(10))).unwrap();
        assert_eq!(target.category_id, id(2));
        assert_eq!(target.subcategory_id, None);
    }

    #[test]
    fn test_deep_link_unknown_ids_resolve_to_none() {
        assert!(tree().resolve_deep_link(Some(id(404)), None).is_none());
        assert!(tree().resolve_deep_link(None, None).is_none());
    }
}
