use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use notification_template_service::config::Settings;
use notification_template_service::postgres::PostgresPool;
use notification_template_service::server::{create_app, AppState};
use notification_template_service::storage::create_repositories;
use notification_template_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing; the guard flushes spans on drop
    let _telemetry = init_telemetry(&settings.logging, &settings.otel)?;
    tracing::info!(
        storage = %settings.storage.backend,
        "Configuration loaded"
    );

    // Connect to PostgreSQL when selected
    let postgres_pool = if settings.storage.backend == "postgres" {
        connect_postgres(&settings).await
    } else {
        None
    };

    let repos = create_repositories(&settings.storage, postgres_pool.clone());
    let state = AppState::new(settings.clone(), repos, postgres_pool.clone());
    tracing::info!(backend = state.storage_backend, "Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Open the pool and apply migrations; `None` falls back to the memory store.
async fn connect_postgres(settings: &Settings) -> Option<Arc<PostgresPool>> {
    let pool = match PostgresPool::new(&settings.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to PostgreSQL, using memory storage");
            return None;
        }
    };

    if settings.storage.run_migrations {
        if let Err(e) = pool.run_migrations().await {
            tracing::warn!(error = %e, "Failed to run migrations, using memory storage");
            pool.close().await;
            return None;
        }
    }

    tracing::info!(url = %pool.database_url_masked(), "PostgreSQL storage ready");
    Some(Arc::new(pool))
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
