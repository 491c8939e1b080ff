use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidhub_common::AssetStore;
use vidhub_common::storage::FilesystemAssetStore;

use vidhub_server::config::AppConfig;
use vidhub_server::state::AppState;
use vidhub_server::{build_router, database, maintenance, schema};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    schema::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    info!("Database ready");

    let storage = &config.storage;
    tokio::fs::create_dir_all(&storage.temp_dir)
        .await
        .with_context(|| format!("Failed to create {}", storage.temp_dir.display()))?;
    let assets: Arc<dyn AssetStore> = Arc::new(
        FilesystemAssetStore::new(
            storage.root.clone(),
            storage.public_url.clone(),
            storage.max_file_size,
        )
        .await
        .context("Failed to initialize asset store")?,
    );
    info!(root = %storage.root.display(), "Asset store ready");

    tokio::spawn(maintenance::run_maintenance(
        db.clone(),
        assets.clone(),
        config.maintenance.clone(),
    ));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        assets,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
