use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::a025_item_category::{Category, CategoryTree};
use contracts::domain::a026_item_attribute::{AttributeCatalog, AttributeType, AttributeValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Источник справочников склада (только чтение)
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn list_attribute_types(&self) -> Result<Vec<AttributeType>>;

    async fn list_attribute_values(&self) -> Result<Vec<AttributeValue>>;
}

/// Справочники, зафиксированные на время одной сессии мастера
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub categories: CategoryTree,
    pub attributes: AttributeCatalog,
}

impl CatalogSnapshot {
    pub fn new(categories: CategoryTree, attributes: AttributeCatalog) -> Self {
        Self {
            categories,
            attributes,
        }
    }
}

/// Загрузить все три справочника одним снимком
pub async fn load_snapshot(source: &dyn CatalogSource) -> Result<CatalogSnapshot> {
    let (categories, types, values) = tokio::try_join!(
        source.list_categories(),
        source.list_attribute_types(),
        source.list_attribute_values(),
    )?;

    let invalid: Vec<String> = categories
        .iter()
        .filter_map(|c| c.validate().err().map(|e| format!("{}: {}", c.id, e)))
        .collect();
    if !invalid.is_empty() {
        tracing::warn!("Skipping invalid categories: {}", invalid.join("; "));
    }
    let categories: Vec<Category> = categories
        .into_iter()
        .filter(|c| c.validate().is_ok())
        .collect();

    tracing::debug!(
        "Catalog snapshot: {} categories, {} attribute types, {} values",
        categories.len(),
        types.len(),
        values.len()
    );

    Ok(CatalogSnapshot::new(
        CategoryTree::new(categories),
        AttributeCatalog::new(types, values),
    ))
}

/// Формат файла справочника
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(rename = "attributeTypes", default)]
    pub attribute_types: Vec<AttributeType>,

    #[serde(rename = "attributeValues", default)]
    pub attribute_values: Vec<AttributeValue>,
}

/// Справочник из JSON-файла. Файл перечитывается при каждом запросе,
/// поэтому правки подхватываются новыми сессиями без перезапуска.
pub struct JsonFileCatalogSource {
    path: PathBuf,
}

impl JsonFileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<CatalogFile> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot read catalog {}: {}", self.path.display(), e))?;
        let file: CatalogFile = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid catalog {}: {}", self.path.display(), e))?;
        Ok(file)
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalogSource {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.read().await?.categories)
    }

    async fn list_attribute_types(&self) -> Result<Vec<AttributeType>> {
        Ok(self.read().await?.attribute_types)
    }

    async fn list_attribute_values(&self) -> Result<Vec<AttributeValue>> {
        Ok(self.read().await?.attribute_values)
    }
}
