//! Тестовые справочники и подмены внешних зависимостей мастера

use super::draft_store::{DraftStorage, DraftStoreError};
use super::media::PreviewConverter;
use super::submission::ItemSubmitter;
use crate::shared::catalog::{CatalogFile, CatalogSnapshot, CatalogSource};
use async_trait::async_trait;
use contracts::domain::a025_item_category::{
    Category, CategoryId, CategoryTree, GrammaticalGender, ItemKind,
};
use contracts::domain::a026_item_attribute::{
    AttributeCatalog, AttributeMeta, AttributeType, AttributeTypeId, AttributeValue,
};
use contracts::domain::a027_inventory_item::{MediaFile, SubmissionPayload, SubmissionResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const CLOTHING: u128 = 1;
pub const PACKAGING: u128 = 2;
pub const CONSUMABLES: u128 = 3;
pub const GIFTS: u128 = 4;
pub const T_SHIRTS: u128 = 10;
pub const HOODIES: u128 = 11;
pub const GIFT_SETS: u128 = 20;
pub const CERTIFICATES: u128 = 21;

pub fn category_id(n: u128) -> CategoryId {
    CategoryId::new(Uuid::from_u128(n))
}

fn attr_type(n: u128, slug: &str, name: &str) -> AttributeType {
    AttributeType {
        id: AttributeTypeId::new(Uuid::from_u128(100 + n)),
        slug: slug.into(),
        name: name.into(),
        category_id: None,
        show_in_sku: true,
        show_in_name: true,
    }
}

pub fn demo_categories() -> Vec<Category> {
    let mut clothing = Category::new(category_id(CLOTHING), "Одежда");
    clothing.item_kind = ItemKind::Clothing;
    clothing.supports_auto_naming = true;

    let mut packaging = Category::new(category_id(PACKAGING), "Упаковка");
    packaging.item_kind = ItemKind::Packaging;

    let mut consumables = Category::new(category_id(CONSUMABLES), "Расходники");
    consumables.item_kind = ItemKind::Consumables;
    consumables.default_unit = Some("уп.".into());

    let mut t_shirts = Category::new(category_id(T_SHIRTS), "Футболки");
    t_shirts.parent_id = Some(category_id(CLOTHING));
    t_shirts.prefix = Some("TSH".into());
    t_shirts.gender = GrammaticalGender::Feminine;
    t_shirts.singular_name = Some("Футболка".into());

    let mut hoodies = Category::new(category_id(HOODIES), "Худи");
    hoodies.parent_id = Some(category_id(CLOTHING));
    hoodies.prefix = Some("HD".into());
    hoodies.gender = GrammaticalGender::Neuter;

    // автогенерация только у подкатегории наборов
    let gifts = Category::new(category_id(GIFTS), "Подарки");

    let mut gift_sets = Category::new(category_id(GIFT_SETS), "Наборы");
    gift_sets.parent_id = Some(category_id(GIFTS));
    gift_sets.prefix = Some("SET".into());
    gift_sets.singular_name = Some("Набор".into());
    gift_sets.supports_auto_naming = true;
    gift_sets.default_unit = Some("компл.".into());

    let mut certificates = Category::new(category_id(CERTIFICATES), "Сертификаты");
    certificates.parent_id = Some(category_id(GIFTS));

    vec![
        clothing,
        packaging,
        consumables,
        gifts,
        t_shirts,
        hoodies,
        gift_sets,
        certificates,
    ]
}

pub fn demo_attributes() -> AttributeCatalog {
    let mut print = attr_type(7, "print", "Нанесение");
    print.category_id = Some(category_id(HOODIES));

    AttributeCatalog::new(
        vec![
            attr_type(1, "brand", "Бренд"),
            attr_type(2, "quality", "Качество"),
            attr_type(3, "material", "Материал"),
            attr_type(4, "color", "Цвет"),
            attr_type(5, "size", "Размер"),
            attr_type(6, "density", "Плотность"),
            print,
        ],
        vec![
            AttributeValue::new("brand", "NK", "Nike"),
            AttributeValue::new("quality", "PRM", "Премиум"),
            AttributeValue::new("material", "CTN", "Хлопок"),
            AttributeValue::new("color", "BLK", "Черный").with_meta(AttributeMeta {
                fem: Some("Черная".into()),
                neut: Some("Черное".into()),
                ..Default::default()
            }),
            AttributeValue::new("color", "WHT", "Белый").with_meta(AttributeMeta {
                fem: Some("Белая".into()),
                neut: Some("Белое".into()),
                ..Default::default()
            }),
            AttributeValue::new("size", "L", "L"),
            AttributeValue::new("density", "160", "160 г/м²").with_meta(AttributeMeta {
                show_in_name: Some(false),
                ..Default::default()
            }),
            AttributeValue::new("print", "DTF", "DTF печать"),
        ],
    )
}

pub fn demo_snapshot() -> Arc<CatalogSnapshot> {
    Arc::new(CatalogSnapshot::new(
        CategoryTree::new(demo_categories()),
        demo_attributes(),
    ))
}

pub fn photo(name: &str) -> MediaFile {
    MediaFile::new(format!("{}.webp", name), "image/webp", vec![0x52, 0x49, 0x46, 0x46])
}

// ============================================================================
// Fakes
// ============================================================================

pub struct FakeCatalogSource;

#[async_trait]
impl CatalogSource for FakeCatalogSource {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        Ok(demo_categories())
    }

    async fn list_attribute_types(&self) -> anyhow::Result<Vec<AttributeType>> {
        Ok(demo_attributes().types().to_vec())
    }

    async fn list_attribute_values(&self) -> anyhow::Result<Vec<AttributeValue>> {
        Ok(demo_attributes().values().to_vec())
    }
}

impl FakeCatalogSource {
    pub fn file() -> CatalogFile {
        CatalogFile {
            categories: demo_categories(),
            attribute_types: demo_attributes().types().to_vec(),
            attribute_values: demo_attributes().values().to_vec(),
        }
    }
}

/// Хранилище черновиков в памяти со счетчиком записей
#[derive(Default, Clone)]
pub struct MemoryDraftStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
    removals: Arc<AtomicUsize>,
}

impl MemoryDraftStorage {
    pub fn with_entry(key: &str, payload: &str) -> Self {
        let storage = Self::default();
        storage
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
        storage
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DraftStorage for MemoryDraftStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, DraftStoreError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, payload: &str) -> Result<(), DraftStoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DraftStoreError> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Обработчик отправки, запоминающий все полученные формы
pub struct RecordingSubmitter {
    pub received: Mutex<Vec<SubmissionPayload>>,
    pub delay: Duration,
    pub response: SubmissionResult,
}

impl RecordingSubmitter {
    pub fn succeeding(delay: Duration) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            delay,
            response: SubmissionResult::ok(Some("item-1".into())),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            response: SubmissionResult::failure(error),
        }
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl ItemSubmitter for RecordingSubmitter {
    async fn submit(&self, payload: SubmissionPayload) -> anyhow::Result<SubmissionResult> {
        self.received.lock().unwrap().push(payload);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.response.clone())
    }
}

/// Превью вида "preview:<имя файла>", с настраиваемой задержкой
pub struct FakePreviewConverter {
    pub delay: Duration,
}

#[async_trait]
impl PreviewConverter for FakePreviewConverter {
    async fn to_preview(&self, file: &MediaFile) -> anyhow::Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(format!("preview:{}", file.file_name))
    }
}
