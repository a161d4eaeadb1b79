pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u508_create_inventory_item::CreateInventoryItem;
use std::sync::Arc;
use std::time::Duration;

use usecases::u508_create_inventory_item::{
    DataUriPreviewConverter, DraftStore, FileDraftStorage, HttpItemSubmitter, WizardExecutor,
};

/// Максимальный размер запроса с фотографиями
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Период проверки простаивающих сессий
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::extract::DefaultBodyLimit;
    use axum::http::{header, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        let start = std::time::Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = next.run(req).await;

        let status = response.status();
        let elapsed = start.elapsed().as_millis();
        if status.is_server_error() {
            tracing::warn!("{} {} {} {}ms", status.as_u16(), method, path, elapsed);
        } else {
            tracing::info!("{} {} {} {}ms", status.as_u16(), method, path, elapsed);
        }
        response
    }

    let config = shared::config::load_config()?;

    let catalog_path = shared::config::resolve_path(&config.catalog.path);
    let drafts_dir = shared::config::resolve_path(&config.drafts.dir);
    tracing::info!("Catalog: {}", catalog_path.display());
    tracing::info!("Drafts: {}", drafts_dir.display());

    let catalog_source = Arc::new(shared::catalog::JsonFileCatalogSource::new(catalog_path));
    let drafts = DraftStore::spawn(
        Arc::new(FileDraftStorage::new(drafts_dir)),
        config.drafts.debounce(),
        config.drafts.ttl()?,
    );
    let submitter = Arc::new(HttpItemSubmitter::new(
        config.submission.endpoint.clone(),
        Duration::from_secs(config.submission.timeout_secs),
    )?);
    let previews = Arc::new(DataUriPreviewConverter::default());

    let executor = Arc::new(
        WizardExecutor::new(catalog_source, drafts, submitter, previews)
            .with_idle_timeout(config.sessions.idle_timeout()),
    );
    if let Some(idle) = config.sessions.idle_timeout() {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(idle.min(SESSION_SWEEP_INTERVAL));
            loop {
                sweep.tick().await;
                executor.evict_idle_sessions();
            }
        });
    }
    handlers::u508_create_inventory_item::install(executor)?;

    tracing::info!(
        "{} ({}) routes under {}",
        CreateInventoryItem::display_name(),
        CreateInventoryItem::full_name(),
        CreateInventoryItem::route_prefix()
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes()
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
