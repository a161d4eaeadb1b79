use super::draft::ItemDraft;
use super::media::MediaFile;
use crate::domain::a025_item_category::{CategoryId, ItemKind, DEFAULT_UNIT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Бинарное вложение формы
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadAttachment {
    pub field: &'static str,
    pub file: MediaFile,
}

/// Плоская форма создания позиции: строковые поля и бинарные вложения
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPayload {
    pub fields: Vec<(String, String)>,
    pub attachments: Vec<PayloadAttachment>,
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

impl SubmissionPayload {
    /// Собрать форму из черновика.
    /// `category_id` - подкатегория, если выбрана, иначе категория.
    pub fn from_draft(draft: &ItemDraft, category_id: CategoryId, kind: ItemKind) -> Self {
        let mut payload = Self::default();

        payload.push("itemType", kind.as_str());
        payload.push("name", draft.item_name.trim());
        payload.push("categoryId", category_id.to_string());
        payload.push("sku", draft.sku.trim());
        payload.push("unit", or_default(&draft.unit, DEFAULT_UNIT));
        payload.push("description", draft.description.as_str());
        payload.push("quantity", or_default(&draft.quantity, "0"));
        payload.push(
            "criticalStockThreshold",
            or_default(&draft.critical_stock_threshold, "0"),
        );
        payload.push("lowStockThreshold", or_default(&draft.low_stock_threshold, "10"));
        payload.push(
            "storageLocationId",
            draft.storage_location_id.clone().unwrap_or_default(),
        );
        payload.push("costPrice", or_default(&draft.cost_price, "0"));
        payload.push("sellingPrice", or_default(&draft.selling_price, "0"));

        payload.push("qualityCode", draft.quality_code.clone().unwrap_or_default());
        payload.push("materialCode", draft.material_code.clone().unwrap_or_default());
        payload.push("brandCode", draft.brand_code.clone().unwrap_or_default());
        payload.push("attributeCode", draft.color_code.clone().unwrap_or_default());
        payload.push("sizeCode", draft.size_code.clone().unwrap_or_default());

        let optional = [
            ("width", &draft.width),
            ("height", &draft.height),
            ("depth", &draft.depth),
            ("weight", &draft.weight),
            ("department", &draft.department),
            ("supplierName", &draft.supplier_name),
            ("supplierLink", &draft.supplier_link),
            ("minBatch", &draft.min_batch),
        ];
        for (name, value) in optional {
            if !value.trim().is_empty() {
                payload.push(name, value.trim());
            }
        }

        // у упаковки тип есть всегда, у остальных только если выбран
        let packaging_type = match kind {
            ItemKind::Packaging => Some(draft.packaging_type.unwrap_or_default()),
            _ => draft.packaging_type,
        };
        if let Some(packaging_type) = packaging_type {
            payload.push("packagingType", packaging_type.as_str());
        }
        if !draft.features.is_empty() {
            payload.push("features", json!(draft.features).to_string());
        }

        let thumbnail = json!(draft.thumb_settings);
        let mut attributes: Map<String, Value> = draft
            .attributes
            .iter()
            .map(|(slug, code)| (slug.clone(), Value::String(code.clone())))
            .collect();
        attributes.insert("thumbnailSettings".to_string(), thumbnail.clone());

        payload.push("thumbnailSettings", thumbnail.to_string());
        payload.push("attributes", Value::Object(attributes).to_string());

        for (slot, attachment) in draft.media.attachments() {
            payload.attachments.push(PayloadAttachment {
                field: slot.field_name(),
                file: attachment.file.clone(),
            });
        }

        payload
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attachments_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a PayloadAttachment> + 'a {
        self.attachments.iter().filter(move |a| a.field == field)
    }
}

/// Созданная позиция
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedItem {
    pub id: String,
}

/// Ответ внешнего обработчика создания
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CreatedItem>,
}

impl SubmissionResult {
    pub fn ok(id: Option<String>) -> Self {
        Self {
            success: true,
            error: None,
            data: id.map(|id| CreatedItem { id }),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a027_inventory_item::media::{MediaAttachment, MediaSlot};
    use crate::domain::a027_inventory_item::packaging::{PackagingFeature, PackagingType};
    use uuid::Uuid;

    fn attachment(name: &str) -> MediaAttachment {
        MediaAttachment {
            file: MediaFile::new(name, "image/webp", vec![7]),
            preview: String::new(),
        }
    }

    #[test]
    fn test_blank_stock_fields_get_defaults() {
        let draft = ItemDraft {
            item_name: "Футболка".into(),
            storage_location_id: Some("loc-1".into()),
            ..Default::default()
        };
        let category = CategoryId::new(Uuid::from_u128(5));
        let payload = SubmissionPayload::from_draft(&draft, category, ItemKind::Clothing);

        assert_eq!(payload.field("itemType"), Some("clothing"));
        assert_eq!(payload.field("quantity"), Some("0"));
        assert_eq!(payload.field("lowStockThreshold"), Some("10"));
        assert_eq!(payload.field("criticalStockThreshold"), Some("0"));
        assert_eq!(payload.field("unit"), Some(DEFAULT_UNIT));
        assert_eq!(payload.field("storageLocationId"), Some("loc-1"));
        assert_eq!(payload.field("categoryId"), Some(category.to_string().as_str()));
        assert_eq!(payload.field("width"), None);
    }

    #[test]
    fn test_attributes_and_thumbnail_are_json_encoded() {
        let mut draft = ItemDraft::default();
        draft.attributes.insert("density".into(), "160".into());

        let payload =
            SubmissionPayload::from_draft(&draft, CategoryId::new(Uuid::nil()), ItemKind::General);

        let attributes: Value = serde_json::from_str(payload.field("attributes").unwrap()).unwrap();
        assert_eq!(attributes["density"], "160");
        assert_eq!(attributes["thumbnailSettings"]["zoom"], 1.0);

        let thumbnail: Value =
            serde_json::from_str(payload.field("thumbnailSettings").unwrap()).unwrap();
        assert_eq!(thumbnail["x"], 0.0);
    }

    #[test]
    fn test_images_use_fixed_field_names() {
        let mut draft = ItemDraft::default();
        draft.media.put(MediaSlot::Main, attachment("front"));
        draft.media.put(MediaSlot::Back, attachment("back"));
        draft.media.put(MediaSlot::Side, attachment("side"));
        for name in ["d1", "d2", "d3"] {
            draft.media.put(MediaSlot::Detail, attachment(name));
        }

        let payload =
            SubmissionPayload::from_draft(&draft, CategoryId::new(Uuid::nil()), ItemKind::Clothing);

        assert_eq!(payload.attachments.len(), 6);
        assert_eq!(payload.attachments_named("image").count(), 1);
        assert_eq!(payload.attachments_named("imageBack").count(), 1);
        assert_eq!(payload.attachments_named("imageSide").count(), 1);
        assert_eq!(payload.attachments_named("imageDetails").count(), 3);
    }

    #[test]
    fn test_packaging_fields() {
        let category = CategoryId::new(Uuid::from_u128(2));

        let mut draft = ItemDraft {
            supplier_name: " Упакуй-ка ".into(),
            min_batch: "500".into(),
            features: vec![PackagingFeature::GluedValve, PackagingFeature::TearTape],
            ..Default::default()
        };
        let payload = SubmissionPayload::from_draft(&draft, category, ItemKind::Packaging);

        assert_eq!(payload.field("packagingType"), Some("individual"));
        assert_eq!(payload.field("supplierName"), Some("Упакуй-ка"));
        assert_eq!(payload.field("minBatch"), Some("500"));
        assert_eq!(payload.field("supplierLink"), None);
        let features: Value = serde_json::from_str(payload.field("features").unwrap()).unwrap();
        assert_eq!(features, json!(["glued_valve", "tear_tape"]));

        draft.packaging_type = Some(PackagingType::Transport);
        draft.features.clear();
        let payload = SubmissionPayload::from_draft(&draft, category, ItemKind::Packaging);
        assert_eq!(payload.field("packagingType"), Some("transport"));
        assert_eq!(payload.field("features"), None);

        let clothing =
            SubmissionPayload::from_draft(&ItemDraft::default(), category, ItemKind::Clothing);
        assert_eq!(clothing.field("packagingType"), None);
        assert_eq!(clothing.field("minBatch"), None);
    }

    #[test]
    fn test_submission_result_wire_format() {
        let failure: SubmissionResult =
            serde_json::from_str(r#"{"success":false,"error":"SKU уже существует"}"#).unwrap();
        assert!(!failure.success);
        assert_eq!(failure.error.as_deref(), Some("SKU уже существует"));

        let ok: SubmissionResult = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(ok, SubmissionResult::ok(None));
    }
}
