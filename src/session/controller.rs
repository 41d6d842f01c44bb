use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::feedback::{FeedbackRecord, FeedbackStore, Vote};
use crate::session::{ChatSession, DraftState, PendingCall, SessionError};
use crate::summarize::models::{Dialect, SummaryResponse};
use crate::summarize::{SummarizeError, Summarizer};

/// One question with its answer, as shown in the chat.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeView {
    pub index: usize,
    pub question: String,
    pub submitted_at: DateTime<Utc>,
    pub time: String,
    pub response: Option<SummaryResponse>,
    pub display_text: Option<String>,
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub draft: DraftState,
    pub in_flight: bool,
    pub exchanges: Vec<ExchangeView>,
}

/// Drives a [`ChatSession`] against a summarizer and the feedback store.
///
/// The session lock is released while the summarizer call is pending, so
/// draft edits and snapshots are served in the meantime.
pub struct SessionController {
    session: Arc<Mutex<ChatSession>>,
    summarizer: Arc<dyn Summarizer>,
    feedback: Arc<FeedbackStore>,
    user_name: String,
}

impl SessionController {
    pub fn new(
        default_dialect: Dialect,
        summarizer: Arc<dyn Summarizer>,
        feedback: Arc<FeedbackStore>,
        user_name: String,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(ChatSession::new(default_dialect))),
            summarizer,
            feedback,
            user_name,
        }
    }

    pub fn feedback_store(&self) -> &Arc<FeedbackStore> {
        &self.feedback
    }

    pub async fn update_draft_text(&self, text: String) {
        self.session.lock().await.update_draft_text(text);
    }

    pub async fn update_draft_hint(&self, hint: String) {
        self.session.lock().await.update_draft_hint(hint);
    }

    pub async fn update_dialect(&self, dialect: Dialect) {
        self.session.lock().await.update_dialect(dialect);
    }

    /// Submits the current draft. `Ok(None)` when the draft text is blank.
    pub async fn submit(&self) -> Result<Option<ExchangeView>, SessionError> {
        let call = match self.session.lock().await.begin_submit()? {
            Some(call) => call,
            None => return Ok(None),
        };
        info!("Submitting question #{}", call.index);
        self.dispatch(call).await.map(Some)
    }

    pub async fn redo(&self, index: usize) -> Result<ExchangeView, SessionError> {
        let call = self.session.lock().await.begin_redo(index)?;
        info!("Re-asking question #{} as #{}", index, call.index);
        self.dispatch(call).await
    }

    // The call runs on its own task so it still settles if the caller goes away
    async fn dispatch(&self, call: PendingCall) -> Result<ExchangeView, SessionError> {
        let session = Arc::clone(&self.session);
        let summarizer = Arc::clone(&self.summarizer);

        let task = {
            let session = Arc::clone(&session);
            let call = call.clone();
            tokio::spawn(async move {
                let result = summarizer.summarize(&call.question, call.dialect).await;
                if let Err(e) = &result {
                    warn!("Question #{} failed: {}", call.index, e);
                }

                let mut session = session.lock().await;
                session.settle(&call, result);
                exchange_view(&session, call.index)
            })
        };

        match task.await {
            Ok(view) => Ok(view),
            Err(e) => {
                error!("Summarizer task for question #{} failed: {}", call.index, e);
                let mut session = session.lock().await;
                // The task died before recording anything
                if session.responses().len() == call.index {
                    session.settle(&call, Err(SummarizeError::Aborted(e.to_string())));
                }
                Ok(exchange_view(&session, call.index))
            }
        }
    }

    pub async fn record_feedback(&self, index: usize, vote: Vote) -> Result<(), SessionError> {
        let record = {
            let session = self.session.lock().await;
            let (entry, response) = session.exchange(index)?;
            FeedbackRecord::new(
                entry.text.clone(),
                response.clone(),
                vote,
                self.user_name.clone(),
            )
        };

        self.feedback.append(&record).await?;
        info!("Recorded {:?} feedback for question #{}", vote, index);
        Ok(())
    }

    /// Full feedback list as the JSON array offered for download.
    pub async fn export_feedback(&self) -> Result<String, SessionError> {
        Ok(self.feedback.export_json().await?)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            draft: session.draft().clone(),
            in_flight: session.in_flight(),
            exchanges: (0..session.transcript().len())
                .map(|i| exchange_view(&session, i))
                .collect(),
        }
    }
}

fn exchange_view(session: &ChatSession, index: usize) -> ExchangeView {
    let entry = &session.transcript()[index];
    let response = session.responses().get(index).cloned();

    ExchangeView {
        index,
        question: entry.text.clone(),
        submitted_at: entry.submitted_at,
        time: entry.local_time(),
        display_text: response.as_ref().map(SummaryResponse::display_text),
        is_error: response.as_ref().is_some_and(SummaryResponse::is_error),
        response,
    }
}
