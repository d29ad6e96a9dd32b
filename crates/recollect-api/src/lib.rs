//! Recollect API — HTTP surface over one interview session plus the viewer
//! websocket.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the viewer's origin once it is served separately.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/interview", routes::interview::router())
        .nest("/api/v1/viewer", routes::viewer::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
