use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - session state and feedback
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Chat session
            .route("/session", get(handlers::api::get_session))
            .route("/session/draft", put(handlers::api::update_draft))
            .route("/session/submit", post(handlers::api::submit))
            .route("/session/redo/{index}", post(handlers::api::redo))
            .route("/session/feedback/{index}", post(handlers::api::record_feedback))

            // Feedback download
            .route("/feedback/export", get(handlers::api::export_feedback))

            // Reference data and status
            .route("/dialects", get(handlers::api::list_dialects))
            .route("/status", get(handlers::api::system_status))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
    )
}
