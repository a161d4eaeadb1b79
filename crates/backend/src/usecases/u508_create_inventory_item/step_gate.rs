use super::wizard::WizardStep;
use contracts::domain::a025_item_category::{Category, ItemKind};
use contracts::domain::a027_inventory_item::{ItemDraft, REQUIRED_DETAIL_IMAGES};

/// Все, что нужно для проверки шага
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    pub draft: &'a ItemDraft,
    /// Выбранная категория верхнего уровня
    pub category: Option<&'a Category>,
    pub has_subcategories: bool,
    /// Подкатегория в черновике существует и принадлежит категории
    pub subcategory_valid: bool,
    pub auto_naming: bool,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Проверить, можно ли уйти с шага вперед.
/// Ошибка содержит сообщение для пользователя по первому нарушенному правилу.
pub fn check(step: WizardStep, ctx: &GateContext<'_>) -> Result<(), String> {
    match step {
        WizardStep::CategorySelect => check_category(ctx),
        WizardStep::AttributeEntry => check_attributes(ctx),
        WizardStep::MediaEntry => check_media(ctx.draft),
        WizardStep::StockEntry => check_stock(ctx.draft),
    }
}

pub fn can_advance(step: WizardStep, ctx: &GateContext<'_>) -> bool {
    check(step, ctx).is_ok()
}

fn check_category(ctx: &GateContext<'_>) -> Result<(), String> {
    if ctx.category.is_none() {
        return Err("Выберите категорию".into());
    }
    if ctx.has_subcategories && !ctx.subcategory_valid {
        return Err("Выберите подкатегорию".into());
    }
    Ok(())
}

fn check_attributes(ctx: &GateContext<'_>) -> Result<(), String> {
    let draft = ctx.draft;

    if ctx.category.map(|c| c.item_kind) == Some(ItemKind::Packaging) {
        if blank(&draft.width) || blank(&draft.height) || blank(&draft.depth) {
            return Err("Укажите все габариты (Длина, Ширина, Высота)".into());
        }
        if blank(&draft.weight) {
            return Err("Укажите вес единицы упаковки".into());
        }
    }

    if ctx.auto_naming {
        if blank(&draft.item_name) {
            return Err("Название не сформировано: выберите характеристики".into());
        }
        if blank(&draft.sku) {
            return Err("Артикул не сформирован: выберите характеристики".into());
        }
    } else if blank(&draft.item_name) {
        return Err("Введите название позиции".into());
    }

    Ok(())
}

fn check_media(draft: &ItemDraft) -> Result<(), String> {
    let media = &draft.media;
    if media.main.is_none() {
        return Err("Загрузите основное фото товара".into());
    }
    if media.back.is_none() {
        return Err("Загрузите фото со спины".into());
    }
    if media.side.is_none() {
        return Err("Загрузите фото сбоку".into());
    }
    if media.details.len() != REQUIRED_DETAIL_IMAGES {
        return Err(format!(
            "Нужно ровно {} детальных фото, загружено {}",
            REQUIRED_DETAIL_IMAGES,
            media.details.len()
        ));
    }
    Ok(())
}

fn check_stock(draft: &ItemDraft) -> Result<(), String> {
    if draft.storage_location_id.as_deref().map_or(true, blank) {
        return Err("Выберите место хранения".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a025_item_category::CategoryId;
    use contracts::domain::a027_inventory_item::{MediaAttachment, MediaFile, MediaSlot};
    use uuid::Uuid;

    fn photo(name: &str) -> MediaAttachment {
        MediaAttachment {
            file: MediaFile::new(name, "image/webp", vec![1]),
            preview: String::new(),
        }
    }

    fn draft_with_photos(details: usize) -> ItemDraft {
        let mut draft = ItemDraft::default();
        draft.media.put(MediaSlot::Main, photo("main"));
        draft.media.put(MediaSlot::Back, photo("back"));
        draft.media.put(MediaSlot::Side, photo("side"));
        for i in 0..details {
            draft.media.put(MediaSlot::Detail, photo(&format!("d{}", i)));
        }
        draft
    }

    fn ctx<'a>(draft: &'a ItemDraft, category: Option<&'a Category>) -> GateContext<'a> {
        GateContext {
            draft,
            category,
            has_subcategories: false,
            subcategory_valid: false,
            auto_naming: false,
        }
    }

    #[test]
    fn test_media_requires_exactly_three_details() {
        let two = draft_with_photos(2);
        let three = draft_with_photos(3);
        let four = draft_with_photos(4);

        assert!(!can_advance(WizardStep::MediaEntry, &ctx(&two, None)));
        assert!(can_advance(WizardStep::MediaEntry, &ctx(&three, None)));
        assert!(!can_advance(WizardStep::MediaEntry, &ctx(&four, None)));

        let message = check(WizardStep::MediaEntry, &ctx(&two, None)).unwrap_err();
        assert!(message.contains("загружено 2"));
    }

    #[test]
    fn test_media_reports_first_missing_slot() {
        let mut draft = draft_with_photos(3);
        draft.media.remove(MediaSlot::Back, None);
        assert_eq!(
            check(WizardStep::MediaEntry, &ctx(&draft, None)),
            Err("Загрузите фото со спины".to_string())
        );
    }

    #[test]
    fn test_category_step_requires_subcategory_when_children_exist() {
        let draft = ItemDraft::default();
        let category = Category::new(CategoryId::new(Uuid::from_u128(1)), "Одежда");

        assert_eq!(
            check(WizardStep::CategorySelect, &ctx(&draft, None)),
            Err("Выберите категорию".to_string())
        );

        let mut gate = ctx(&draft, Some(&category));
        gate.has_subcategories = true;
        assert_eq!(
            check(WizardStep::CategorySelect, &gate),
            Err("Выберите подкатегорию".to_string())
        );

        gate.subcategory_valid = true;
        assert!(can_advance(WizardStep::CategorySelect, &gate));
    }

    #[test]
    fn test_attributes_step_manual_and_generated_names() {
        let category = Category::new(CategoryId::new(Uuid::from_u128(1)), "Расходники");
        let mut draft = ItemDraft::default();
        assert_eq!(
            check(WizardStep::AttributeEntry, &ctx(&draft, Some(&category))),
            Err("Введите название позиции".to_string())
        );

        draft.item_name = "Скотч".into();
        assert!(can_advance(WizardStep::AttributeEntry, &ctx(&draft, Some(&category))));

        let mut gate = ctx(&draft, Some(&category));
        gate.auto_naming = true;
        assert!(check(WizardStep::AttributeEntry, &gate)
            .unwrap_err()
            .starts_with("Артикул"));
    }

    #[test]
    fn test_packaging_requires_dimensions_and_weight() {
        let mut category = Category::new(CategoryId::new(Uuid::from_u128(2)), "Упаковка");
        category.item_kind = ItemKind::Packaging;
        let mut draft = ItemDraft {
            item_name: "Коробка".into(),
            width: "20".into(),
            height: "10".into(),
            ..Default::default()
        };
        assert!(check(WizardStep::AttributeEntry, &ctx(&draft, Some(&category)))
            .unwrap_err()
            .starts_with("Укажите все габариты"));

        draft.depth = "5".into();
        assert_eq!(
            check(WizardStep::AttributeEntry, &ctx(&draft, Some(&category))),
            Err("Укажите вес единицы упаковки".to_string())
        );

        draft.weight = "0.2".into();
        assert!(can_advance(WizardStep::AttributeEntry, &ctx(&draft, Some(&category))));
    }

    #[test]
    fn test_stock_step_requires_location_only() {
        let mut draft = ItemDraft::default();
        assert!(!can_advance(WizardStep::StockEntry, &ctx(&draft, None)));

        draft.storage_location_id = Some("loc-1".into());
        assert!(draft.quantity.is_empty());
        assert!(can_advance(WizardStep::StockEntry, &ctx(&draft, None)));
    }
}
