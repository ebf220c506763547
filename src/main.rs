use std::sync::Arc;

use tokio::{signal, sync::mpsc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use reeftide_api as api;

use api::handlers::AppServices;
use api::services::catalog::{CatalogService, PricingService};
use api::services::storage::InMemoryCatalogStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = Arc::new(api::events::EventSender::new(event_tx));
    tokio::spawn(api::events::process_events(event_rx));

    // Build services over the in-memory store
    let store = Arc::new(InMemoryCatalogStore::new());
    let services = AppServices {
        catalog: Arc::new(CatalogService::with_image_limit(
            store.clone(),
            event_sender.clone(),
            cfg.max_image_bytes,
        )),
        pricing: Arc::new(PricingService::new(store, event_sender.clone())),
    };

    let state = api::AppState {
        config: cfg.clone(),
        event_sender,
        services,
    };

    let app = api::app_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Bind and serve
    let addr = cfg.server_address();
    info!("reeftide-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
