use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // U508 CREATE INVENTORY ITEM
        // ========================================
        .route(
            "/api/u508/catalog",
            get(handlers::u508_create_inventory_item::get_catalog),
        )
        .route(
            "/api/u508/sessions",
            post(handlers::u508_create_inventory_item::start_session),
        )
        .route(
            "/api/u508/sessions/:id",
            get(handlers::u508_create_inventory_item::get_session)
                .delete(handlers::u508_create_inventory_item::close_session),
        )
        .route(
            "/api/u508/sessions/:id/draft",
            patch(handlers::u508_create_inventory_item::update_draft),
        )
        .route(
            "/api/u508/sessions/:id/category",
            post(handlers::u508_create_inventory_item::select_category),
        )
        .route(
            "/api/u508/sessions/:id/subcategory",
            post(handlers::u508_create_inventory_item::select_subcategory),
        )
        .route(
            "/api/u508/sessions/:id/next",
            post(handlers::u508_create_inventory_item::next_step),
        )
        .route(
            "/api/u508/sessions/:id/back",
            post(handlers::u508_create_inventory_item::previous_step),
        )
        .route(
            "/api/u508/sessions/:id/goto",
            post(handlers::u508_create_inventory_item::go_to_step),
        )
        .route(
            "/api/u508/sessions/:id/media/:slot",
            post(handlers::u508_create_inventory_item::upload_media)
                .delete(handlers::u508_create_inventory_item::remove_media),
        )
        .route(
            "/api/u508/sessions/:id/thumbnail",
            put(handlers::u508_create_inventory_item::set_thumbnail),
        )
        .route(
            "/api/u508/sessions/:id/submit",
            post(handlers::u508_create_inventory_item::submit),
        )
        .route(
            "/api/u508/sessions/:id/reset",
            post(handlers::u508_create_inventory_item::reset),
        )
}
