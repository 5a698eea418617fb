//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = match &state.config.client_origin {
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
                .collect();
            CorsLayer::new().allow_origin(allowed)
        }
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    players: usize,
    connections: usize,
    tick: u64,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        players: state.arena.player_count(),
        connections: state.registry.connection_count(),
        tick: state.arena.tick(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::game::{Arena, GameConfig, Level, Simulation};
    use crate::ws::registry::ConnectionRegistry;

    #[tokio::test]
    async fn test_health_reports_arena() {
        let registry = Arc::new(ConnectionRegistry::new());
        let sim = Simulation::new(GameConfig::default(), Level::empty(), 1);
        let (_arena, handle) = Arena::new(sim, registry.clone(), 30);
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::new(config, handle, registry);

        let Json(health) = health_handler(State(state.clone())).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.players, 0);
        assert_eq!(health.connections, 0);
        assert_eq!(health.tick, 0);

        // Router assembles with both routes
        let _router = build_router(state);
    }
}
