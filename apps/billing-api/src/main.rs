//! # Billing API Server
//!
//! ```text
//! ApiConfig::load ──► Database (migrations) ──► JsonFileSessionStore
//!                                   │
//!                                   ▼
//!                     axum::serve on BAKELINE_BIND_ADDR:BAKELINE_HTTP_PORT
//!                                   │
//!                        Ctrl+C / SIGTERM ──► graceful shutdown
//! ```

use std::sync::Arc;

use bakeline_billing_api::{
    init_tracing, router, ApiConfig, AppState, CartRegistry, JsonFileSessionStore,
};
use bakeline_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting Bakeline billing API...");

    let config = ApiConfig::load()?;
    let addr = config.socket_addr()?;
    info!(
        addr = %addr,
        database = %config.database_path.display(),
        sessions = %config.session_dir.display(),
        tax_mode = config.default_tax_mode.as_str(),
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    let store = JsonFileSessionStore::open(&config.session_dir)?;
    let carts = CartRegistry::new(Arc::new(store));

    let state = AppState::new(db.clone(), carts, config);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
