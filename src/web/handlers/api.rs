use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::feedback::{EXPORT_FILE_NAME, Vote};
use crate::session::SessionError;
use crate::session::controller::{ExchangeView, SessionSnapshot};
use crate::summarize::models::Dialect;
use crate::web::state::AppState;

// Session types

#[derive(Debug, Deserialize)]
pub struct DraftUpdateRequest {
    pub text: Option<String>,
    pub hint: Option<String>,
    pub dialect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub vote: Vote,
}

#[derive(Debug, Serialize)]
pub struct DialectInfo {
    pub value: &'static str,
    pub label: &'static str,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub question_count: usize,
    pub in_flight: bool,
    pub feedback_count: usize,
    pub summarizer_url: String,
}

fn session_error(e: SessionError) -> (StatusCode, String) {
    let status = match &e {
        SessionError::Busy => StatusCode::CONFLICT,
        SessionError::UnknownEntry(_) | SessionError::NoResponse(_) => StatusCode::NOT_FOUND,
        SessionError::Feedback(_) => {
            error!("Session error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

// API Implementations

pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.snapshot().await)
}

pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DraftUpdateRequest>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    // Validate before touching anything so a bad dialect leaves the draft as it was
    let dialect = match &payload.dialect {
        Some(value) => Some(value.parse::<Dialect>().map_err(|e| {
            warn!("Rejected draft update: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        })?),
        None => None,
    };

    if let Some(text) = payload.text {
        state.controller.update_draft_text(text).await;
    }
    if let Some(hint) = payload.hint {
        state.controller.update_draft_hint(hint).await;
    }
    if let Some(dialect) = dialect {
        info!("Dialect changed to {}", dialect);
        state.controller.update_dialect(dialect).await;
    }

    Ok(Json(state.controller.snapshot().await))
}

pub async fn submit(State(state): State<Arc<AppState>>) -> Result<Response, (StatusCode, String)> {
    match state.controller.submit().await.map_err(session_error)? {
        Some(view) => Ok(Json(view).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub async fn redo(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ExchangeView>, (StatusCode, String)> {
    state
        .controller
        .redo(index)
        .await
        .map(Json)
        .map_err(session_error)
}

pub async fn record_feedback(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .controller
        .record_feedback(index, payload.vote)
        .await
        .map_err(session_error)?;
    Ok(StatusCode::CREATED)
}

pub async fn export_feedback(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let body = state
        .controller
        .export_feedback()
        .await
        .map_err(session_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

pub async fn list_dialects() -> Json<Vec<DialectInfo>> {
    Json(
        Dialect::ALL
            .iter()
            .map(|d| DialectInfo {
                value: d.as_str(),
                label: d.label(),
            })
            .collect(),
    )
}

pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let snapshot = state.controller.snapshot().await;

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        question_count: snapshot.exchanges.len(),
        in_flight: snapshot.in_flight,
        feedback_count: state.controller.feedback_store().count().await,
        summarizer_url: state.config.summarizer.endpoint(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::feedback::FeedbackStore;
    use crate::session::controller::SessionController;
    use crate::session::controller::tests::{ScriptedSummarizer, temp_store_path};
    use crate::web::{app, templates::init_templates};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app(name: &str, summarizer: ScriptedSummarizer) -> (Router, std::path::PathBuf) {
        let path = temp_store_path(name);
        let store = Arc::new(FeedbackStore::open(&path).await.unwrap());
        let controller = SessionController::new(
            Dialect::Sqlite,
            Arc::new(summarizer),
            store,
            "RD".to_string(),
        );
        let state = Arc::new(AppState::new(
            AppConfig::default(),
            init_templates().unwrap(),
            controller,
        ));
        (app(state), path)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn chat_round_trip_through_the_api() {
        let (router, path) = test_app(
            "api-chat",
            ScriptedSummarizer::answering(json!({ "summary": "Acme Corp" })),
        )
        .await;

        let response = send(
            &router,
            "PUT",
            "/api/session/draft",
            Some(json!({ "text": "top customers", "hint": "last quarter", "dialect": "postgres" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["draft"]["dialect"], json!("postgres"));

        let response = send(&router, "POST", "/api/session/submit", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let view = json_body(response).await;
        assert_eq!(view["question"], json!("top customers (Hint: last quarter)"));
        assert_eq!(view["display_text"], json!("Acme Corp"));

        let response = send(&router, "POST", "/api/session/redo/0", None).await;
        assert_eq!(json_body(response).await["index"], json!(1));

        let response = send(&router, "GET", "/api/session", None).await;
        let snapshot = json_body(response).await;
        assert_eq!(snapshot["exchanges"].as_array().unwrap().len(), 2);
        assert_eq!(snapshot["in_flight"], json!(false));
        assert_eq!(snapshot["draft"]["text"], json!(""));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn busy_submit_keeps_the_draft() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let summarizer = ScriptedSummarizer {
            gate: Some(Arc::clone(&gate)),
            ..ScriptedSummarizer::answering(json!({ "summary": "done" }))
        };
        let (router, path) = test_app("api-busy", summarizer).await;

        send(&router, "PUT", "/api/session/draft", Some(json!({ "text": "slow one" }))).await;
        let first = {
            let router = router.clone();
            tokio::spawn(async move { send(&router, "POST", "/api/session/submit", None).await })
        };
        while json_body(send(&router, "GET", "/api/session", None).await).await["in_flight"]
            != json!(true)
        {
            tokio::task::yield_now().await;
        }

        send(
            &router,
            "PUT",
            "/api/session/draft",
            Some(json!({ "text": "next question", "hint": "by week" })),
        )
        .await;
        let response = send(&router, "POST", "/api/session/submit", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let snapshot = json_body(send(&router, "GET", "/api/session", None).await).await;
        assert_eq!(snapshot["draft"]["text"], json!("next question"));
        assert_eq!(snapshot["draft"]["hint"], json!("by week"));
        assert_eq!(snapshot["exchanges"].as_array().unwrap().len(), 1);

        gate.notify_one();
        assert_eq!(first.await.unwrap().status(), StatusCode::OK);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn blank_submit_is_no_content() {
        let (router, path) =
            test_app("api-blank", ScriptedSummarizer::answering(json!({ "summary": "x" }))).await;

        let response = send(&router, "POST", "/api/session/submit", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn unknown_dialect_is_rejected() {
        let (router, path) =
            test_app("api-dialect", ScriptedSummarizer::answering(json!({}))).await;

        let response = send(
            &router,
            "PUT",
            "/api/session/draft",
            Some(json!({ "text": "kept?", "dialect": "oracle" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let snapshot = json_body(send(&router, "GET", "/api/session", None).await).await;
        assert_eq!(snapshot["draft"]["text"], json!(""));
        assert_eq!(snapshot["draft"]["dialect"], json!("sqlite"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn server_error_shows_fixed_message() {
        let (router, path) = test_app("api-500", ScriptedSummarizer::failing(500)).await;

        send(&router, "PUT", "/api/session/draft", Some(json!({ "text": "q" }))).await;
        let view = json_body(send(&router, "POST", "/api/session/submit", None).await).await;
        assert_eq!(view["response"], json!({ "error": "Network response was not ok" }));
        assert_eq!(view["is_error"], json!(true));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn feedback_then_download() {
        let (router, path) = test_app(
            "api-feedback",
            ScriptedSummarizer::answering(json!({ "answer": "12" })),
        )
        .await;

        let response = send(
            &router,
            "POST",
            "/api/session/feedback/0",
            Some(json!({ "vote": 1 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        send(&router, "PUT", "/api/session/draft", Some(json!({ "text": "how many stores" }))).await;
        send(&router, "POST", "/api/session/submit", None).await;

        let response = send(
            &router,
            "POST",
            "/api/session/feedback/0",
            Some(json!({ "vote": 1 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&router, "GET", "/api/feedback/export", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"feedback.json\""
        );
        let records = json_body(response).await;
        assert_eq!(records[0]["feedback"], json!(1));
        assert_eq!(records[0]["userInput"], json!("how many stores"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn index_page_and_status() {
        let (router, path) =
            test_app("api-index", ScriptedSummarizer::answering(json!({}))).await;

        let response = send(&router, "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("PostgreSQL"));

        let status = json_body(send(&router, "GET", "/api/status", None).await).await;
        assert_eq!(status["question_count"], json!(0));
        assert_eq!(status["feedback_count"], json!(0));

        let dialects = json_body(send(&router, "GET", "/api/dialects", None).await).await;
        assert_eq!(dialects.as_array().unwrap().len(), 6);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
