//! vmc-rc library - Referee control service
//!
//! HTTP front of the match controller: match setup, referee actions,
//! report export and live SSE feeds for scoreboard displays.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vmc_common::store::MatchStore;
use vmc_common::MatchController;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: MatchController,
}

impl AppState {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self {
            controller: MatchController::new(store),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let matches = Router::new()
        .route("/api/matches", post(api::create_match))
        .route("/api/matches/:code", get(api::get_match))
        .route("/api/matches/:code/actions", post(api::post_action))
        .route("/api/matches/:code/report", get(api::get_report))
        .route("/api/matches/:code/events", get(api::match_events));

    Router::new()
        .merge(matches)
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // Displays are served from other origins (scoreboard screens, tablets)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
