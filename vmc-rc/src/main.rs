//! vmc-rc (Referee Control) - Volleyball match control service
//!
//! Owns match documents, applies referee actions through the rules engine
//! and pushes every change to connected displays over SSE.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use vmc_common::config::{default_config_path, ensure_root_folder, RootFolderResolver, TomlConfig};
use vmc_common::db::init_database;
use vmc_common::events::EventBus;
use vmc_common::store::{MatchStore, MemoryStore, SqliteStore};
use vmc_rc::{build_router, AppState};

/// Command-line arguments for vmc-rc
#[derive(Parser, Debug)]
#[command(name = "vmc-rc")]
#[command(about = "Volleyball match control service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VMC_RC_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Folder holding the match database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Bootstrap TOML configuration file
    #[arg(short, long, env = "VMC_CONFIG")]
    config: Option<PathBuf>,

    /// Keep matches in memory only (nothing survives a restart)
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config_found = config_path.exists();
    let config = TomlConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting VMC Referee Control (vmc-rc) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if config_found {
        info!("Configuration: {}", config_path.display());
    } else {
        warn!("No config file at {}, using defaults", config_path.display());
    }

    let events = EventBus::new(config.event_capacity);
    let store: Arc<dyn MatchStore> = if args.in_memory {
        warn!("Running with in-memory store; matches are lost on exit");
        Arc::new(MemoryStore::new(events))
    } else {
        let resolver = RootFolderResolver::new("vmc-rc");
        let root_folder = resolver.resolve(args.root_folder.as_deref(), config.root_folder.as_deref());
        ensure_root_folder(&root_folder)
            .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;

        let db_path = config.database_file(&root_folder);
        info!("Database path: {}", db_path.display());
        let pool = match init_database(&db_path).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to open database: {}", e);
                return Err(e).context("Database initialization failed");
            }
        };
        Arc::new(SqliteStore::new(pool, events))
    };

    let app = build_router(AppState::new(store));

    let bind = args.bind.unwrap_or(config.bind_address);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vmc-rc listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
