use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::web::state::AppState;
use crate::web::templates::render_index;

// Main UI entry point
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dialect = state.controller.snapshot().await.draft.dialect;
    Html(render_index(
        &state.template_env,
        &state.config.feedback.user_name,
        dialect,
    ))
}
