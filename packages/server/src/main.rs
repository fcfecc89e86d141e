use std::sync::Arc;

use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;
use server::storage::build_blob_side;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database).await?;
    info!("Database connected and schema synced");

    let blobs = build_blob_side(&config.storage).await?;
    info!(backend = %config.storage.backend, "Blob store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        blobs,
        config: Arc::new(config),
    };

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
