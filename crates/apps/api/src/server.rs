use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::database::{
    DetectionStore, MemoryDetectionStore, PgDetectionStore, get_db_pool,
};
use common_services::ocr_client::AzureLayoutClient;
use form_detection::FieldClassifier;
use http::{HeaderValue, header};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Wires up the record store, OCR client and classifier from settings.
pub async fn build_context(settings: AppSettings) -> Result<ApiContext> {
    let store: Arc<dyn DetectionStore> = if let Some(database_url) = &settings.secrets.database_url
    {
        let pool = get_db_pool(database_url, &settings.constants.database).await?;
        Arc::new(PgDetectionStore::new(pool))
    } else {
        warn!("No database URL configured, detections are kept in memory only.");
        Arc::new(MemoryDetectionStore::new())
    };

    if settings.secrets.ocr_endpoint.is_none() || settings.secrets.ocr_key.is_none() {
        warn!("OCR endpoint or key not configured, form imports will fail.");
    }
    let layout_analyzer = Arc::new(AzureLayoutClient::from_settings(
        &settings.secrets,
        &settings.ocr,
    ));
    let classifier = Arc::new(FieldClassifier::new(&settings.detection.classifier)?);

    Ok(ApiContext {
        store,
        layout_analyzer,
        classifier,
        settings,
    })
}

pub async fn serve(settings: AppSettings) -> Result<()> {
    // --- Server Startup ---
    info!("🚀 Initializing server...");
    let api_state = build_context(settings.clone()).await?;

    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
        ]);

    // --- Create Router ---
    let app = create_router(api_state)
        .layer(TraceLayer::new_for_http().on_request(()))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let listener = TcpListener::bind(addr).await?;

    info!("🐸 Server listening on http://{}", addr);
    info!("API docs at {}/docs", settings.api.public_url);

    axum::serve(listener, app).await?;
    Ok(())
}
