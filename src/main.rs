//! Arena Server - authoritative real-time server for a top-down multiplayer arena
//!
//! This is the main entry point for the game server. It handles:
//! - WebSocket connections for real-time gameplay
//! - The fixed-rate simulation tick and full-state broadcast
//! - A health endpoint for monitoring

mod app;
mod config;
mod game;
mod http;
mod util;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;
use crate::game::level::LevelCatalog;
use crate::game::{Arena, Level, Simulation};
use crate::http::build_router;
use crate::util::time::init_server_time;
use crate::ws::registry::ConnectionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);
    init_server_time();

    info!("Starting Arena Server");
    info!("Server address: {}", config.server_addr);

    let level = load_level(&config)?;
    info!(zones = level.zones.len(), "Level loaded");

    // Arena task owns the simulation
    let registry = Arc::new(ConnectionRegistry::new());
    let sim = Simulation::new(config.game.clone(), level, rand::random());
    let (arena, arena_handle) = Arena::new(sim, registry.clone(), config.tick_rate);
    let arena_task = tokio::spawn(arena.run());

    let state = AppState::new(config.clone(), arena_handle.clone(), registry);
    let router = build_router(state);

    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    arena_handle.shutdown();
    if let Err(e) = arena_task.await {
        error!(error = %e, "Arena task failed");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Load the configured level, or an open arena when no level file is set
fn load_level(config: &Config) -> anyhow::Result<Level> {
    let Some(path) = &config.level_path else {
        info!("No LEVEL_PATH set, starting with an empty arena");
        return Ok(Level::empty());
    };

    let catalog = LevelCatalog::load(path)?;
    let level = Level::from_catalog(catalog, &config.level_name, &config.level)
        .with_context(|| format!("Failed to load level {:?} from {}", config.level_name, path.display()))?;
    Ok(level)
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
