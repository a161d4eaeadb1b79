/// Метаданные UseCase для идентификации и документирования
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u508")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "create_inventory_item")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для UI (например, "Создание позиции склада")
    fn display_name() -> &'static str;

    /// Описание UseCase
    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u508_create_inventory_item"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }

    /// Префикс HTTP маршрутов вида "/api/u508"
    fn route_prefix() -> String {
        format!("/api/{}", Self::usecase_index())
    }
}
