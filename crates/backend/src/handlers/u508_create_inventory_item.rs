use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::domain::a027_inventory_item::{ItemDraftPatch, MediaFile, MediaSlot};
use contracts::usecases::u508_create_inventory_item::{
    GoToStepRequest, RemoveMediaQuery, SelectCategoryRequest, SelectSubcategoryRequest,
    StartWizardRequest, SubmitResponse, ThumbnailRequest, WizardView,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::shared::catalog::CatalogFile;
use crate::usecases::u508_create_inventory_item::{WizardError, WizardExecutor};

// ============================================================================
// UseCase u508: Create inventory item
// ============================================================================

static WIZARD_EXECUTOR: OnceCell<Arc<WizardExecutor>> = OnceCell::new();

/// Зарегистрировать executor при старте сервера
pub fn install(executor: Arc<WizardExecutor>) -> anyhow::Result<()> {
    WIZARD_EXECUTOR
        .set(executor)
        .map_err(|_| anyhow::anyhow!("u508 executor is already installed"))
}

fn executor() -> Result<Arc<WizardExecutor>, ApiError> {
    WIZARD_EXECUTOR.get().cloned().ok_or_else(|| ApiError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "Сервис создания позиций не инициализирован".to_string(),
    })
}

/// Ошибка API с телом `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<WizardError> for ApiError {
    fn from(error: WizardError) -> Self {
        let status = match &error {
            WizardError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            WizardError::SubmissionInProgress | WizardError::AlreadySubmitted => {
                StatusCode::CONFLICT
            }
            WizardError::SubmissionFailed(_) => StatusCode::BAD_GATEWAY,
            WizardError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn parse_slot(segment: &str) -> Result<MediaSlot, ApiError> {
    MediaSlot::from_path(segment)
        .ok_or_else(|| ApiError::unprocessable(format!("Неизвестный слот изображения: {}", segment)))
}

/// GET /api/u508/catalog
pub async fn get_catalog() -> Result<Json<CatalogFile>, ApiError> {
    Ok(Json(executor()?.catalog().await?))
}

/// POST /api/u508/sessions
pub async fn start_session(
    Json(request): Json<StartWizardRequest>,
) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(executor()?.start(request).await?))
}

/// GET /api/u508/sessions/:id
pub async fn get_session(Path(id): Path<String>) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(executor()?.view(&id).await?))
}

/// DELETE /api/u508/sessions/:id
pub async fn close_session(Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    executor()?.close(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/u508/sessions/:id/draft
pub async fn update_draft(
    Path(id): Path<String>,
    Json(patch): Json<ItemDraftPatch>,
) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(executor()?.update(&id, patch).await?))
}

/// POST /api/u508/sessions/:id/category
pub async fn select_category(
    Path(id): Path<String>,
    Json(request): Json<SelectCategoryRequest>,
) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(
        executor()?.select_category(&id, request.category_id).await?,
    ))
}

/// POST /api/u508/sessions/:id/subcategory
pub async fn select_subcategory(
    Path(id): Path<String>,
    Json(request): Json<SelectSubcategoryRequest>,
) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(
        executor()?
            .select_subcategory(&id, request.subcategory_id)
            .await?,
    ))
}

/// POST /api/u508/sessions/:id/next
///
/// Отказ проверки шага не является ошибкой запроса: текст приходит в `validationError`.
pub async fn next_step(Path(id): Path<String>) -> Result<Json<WizardView>, ApiError> {
    let executor = executor()?;
    match executor.next(&id).await {
        Ok(view) => Ok(Json(view)),
        Err(WizardError::Validation(_)) => Ok(Json(executor.view(&id).await?)),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/u508/sessions/:id/back
pub async fn previous_step(Path(id): Path<String>) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(executor()?.back(&id).await?))
}

/// POST /api/u508/sessions/:id/goto
pub async fn go_to_step(
    Path(id): Path<String>,
    Json(request): Json<GoToStepRequest>,
) -> Result<Json<WizardView>, ApiError> {
    let executor = executor()?;
    match executor.go_to(&id, request.step).await {
        Ok(view) => Ok(Json(view)),
        Err(WizardError::Validation(_)) => Ok(Json(executor.view(&id).await?)),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/u508/sessions/:id/media/:slot (multipart)
///
/// Несколько детальных фото в одном запросе обрабатываются параллельно.
pub async fn upload_media(
    Path((id, slot)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<Json<WizardView>, ApiError> {
    let slot = parse_slot(&slot)?;
    let executor = executor()?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::unprocessable(format!("Ошибка чтения формы: {}", e)))?
    {
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::unprocessable(format!("Ошибка чтения файла: {}", e)))?;
        files.push(MediaFile::new(file_name, content_type, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiError::unprocessable("Файл не передан"));
    }
    if slot != MediaSlot::Detail && files.len() > 1 {
        return Err(ApiError::unprocessable(
            "В этот слот можно загрузить только один файл",
        ));
    }

    tracing::info!(
        "Session {}: uploading {} file(s) into {:?}",
        id,
        files.len(),
        slot
    );

    let mut uploads = JoinSet::new();
    for file in files {
        let executor = Arc::clone(&executor);
        let id = id.clone();
        uploads.spawn(async move { executor.attach_media(&id, slot, file).await });
    }

    let mut first_error = None;
    while let Some(joined) = uploads.join_next().await {
        let result = joined.map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Upload task failed: {}", e),
        })?;
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }
    if let Some(e) = first_error {
        return Err(e.into());
    }

    Ok(Json(executor.view(&id).await?))
}

/// DELETE /api/u508/sessions/:id/media/:slot?index=N
pub async fn remove_media(
    Path((id, slot)): Path<(String, String)>,
    Query(query): Query<RemoveMediaQuery>,
) -> Result<Json<WizardView>, ApiError> {
    let slot = parse_slot(&slot)?;
    Ok(Json(
        executor()?.remove_media(&id, slot, query.index).await?,
    ))
}

/// PUT /api/u508/sessions/:id/thumbnail
pub async fn set_thumbnail(
    Path(id): Path<String>,
    Json(request): Json<ThumbnailRequest>,
) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(
        executor()?
            .set_thumbnail(&id, request.settings, request.aspect_ratio)
            .await?,
    ))
}

/// POST /api/u508/sessions/:id/submit
pub async fn submit(Path(id): Path<String>) -> Result<Json<SubmitResponse>, ApiError> {
    Ok(Json(executor()?.submit(&id).await?))
}

/// POST /api/u508/sessions/:id/reset
pub async fn reset(Path(id): Path<String>) -> Result<Json<WizardView>, ApiError> {
    Ok(Json(executor()?.reset(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let status = |e: WizardError| ApiError::from(e).status;

        assert_eq!(status(WizardError::SessionNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(WizardError::SubmissionInProgress), StatusCode::CONFLICT);
        assert_eq!(status(WizardError::AlreadySubmitted), StatusCode::CONFLICT);
        assert_eq!(
            status(WizardError::Validation("Выберите категорию".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(WizardError::SubmissionFailed("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(WizardError::CatalogUnavailable("io".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_slot_segments() {
        assert_eq!(parse_slot("main").unwrap(), MediaSlot::Main);
        assert_eq!(parse_slot("imageDetails").unwrap(), MediaSlot::Detail);
        assert_eq!(parse_slot("cover").unwrap_err().status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
