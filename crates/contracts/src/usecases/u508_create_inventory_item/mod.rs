pub mod request;
pub mod response;

pub use request::{
    GoToStepRequest, RemoveMediaQuery, SelectCategoryRequest, SelectSubcategoryRequest,
    StartWizardRequest, ThumbnailRequest,
};
pub use response::{InitSource, SubmitResponse, WizardView};

use crate::usecases::common::UseCaseMetadata;

pub struct CreateInventoryItem;

impl UseCaseMetadata for CreateInventoryItem {
    fn usecase_index() -> &'static str {
        "u508"
    }

    fn usecase_name() -> &'static str {
        "create_inventory_item"
    }

    fn display_name() -> &'static str {
        "Создание позиции склада"
    }

    fn description() -> &'static str {
        "Пошаговый мастер создания позиции: категория, характеристики, фото, остатки"
    }
}
