//! Serverlist - Heartbeat-gated game server registry

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, DatabaseBackend, LogFormat};
use serverlist_api::{AppState, create_router};
use serverlist_auth::JwtManager;
use serverlist_core::{CacheStore, RegistryManager, spawn_sweeper};
use serverlist_db::{Database, MemoryStore, ServerRecordStore};

/// Serverlist - game server registration, liveness and discovery
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "SERVERLIST_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SERVERLIST_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level, config.logging.format);

    info!("Starting Serverlist v{}", env!("CARGO_PKG_VERSION"));

    // Initialize record store
    let store = open_store(&config).await?;

    // Initialize registry
    let manager = Arc::new(RegistryManager::new(
        store,
        Arc::new(CacheStore::new()),
        config.registry.clone(),
    ));

    // Start background eviction
    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(manager.clone(), shutdown.clone());

    // Install Prometheus recorder
    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(Arc::new(handle)),
        Err(e) => {
            warn!("Metrics disabled, failed to install recorder: {}", e);
            None
        }
    };

    // Initialize JWT manager
    let jwt = Arc::new(JwtManager::new(&config.auth.jwt_secret, 24));

    // Create application state
    let state = AppState::new(manager, jwt, config.auth.enabled);

    // Create router
    let mut app = create_router(state, metrics_handle);
    if config.server.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    let app = app.layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            token.cancel();
        })
        .await?;

    // Stop the sweeper even if the server exited on its own
    shutdown.cancel();
    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }

    info!("Server stopped");
    Ok(())
}

/// Open the configured record store
async fn open_store(config: &Config) -> Result<Arc<dyn ServerRecordStore>> {
    match config.database.backend {
        DatabaseBackend::Memory => {
            warn!("Using in-memory record store, registrations are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        DatabaseBackend::Sqlite => {
            // Create data directory
            if let Some(parent) = Path::new(&config.database.path).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create data directory {}", parent.display())
                })?;
            }

            let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
            let db = Database::new(&db_path)
                .await
                .with_context(|| format!("Failed to open database {}", config.database.path))?;
            info!("Using SQLite record store at {}", config.database.path);
            Ok(Arc::new(db))
        }
    }
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
