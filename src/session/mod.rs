pub mod controller;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt;

use crate::feedback::FeedbackError;
use crate::summarize::SummarizeError;
use crate::summarize::models::{Dialect, SummaryResponse};

#[derive(Debug)]
pub enum SessionError {
    /// A submission is already waiting on the summarizer.
    Busy,
    UnknownEntry(usize),
    NoResponse(usize),
    Feedback(FeedbackError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Busy => f.write_str("A question is already being answered"),
            SessionError::UnknownEntry(i) => write!(f, "No question at index {}", i),
            SessionError::NoResponse(i) => write!(f, "No response at index {}", i),
            SessionError::Feedback(e) => write!(f, "{}", e),
        }
    }
}

impl Error for SessionError {}

impl From<FeedbackError> for SessionError {
    fn from(e: FeedbackError) -> Self {
        SessionError::Feedback(e)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DraftState {
    pub text: String,
    pub hint: String,
    pub dialect: Dialect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Wall-clock `HH:MM:SS` shown next to the question.
    pub fn local_time(&self) -> String {
        self.submitted_at
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

/// A question that has been written to the transcript and still needs its
/// answer. Handed back to [`ChatSession::settle`] once the call finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCall {
    pub index: usize,
    pub question: String,
    pub dialect: Dialect,
}

/// Builds the outbound question; a blank hint is dropped.
pub fn compose_question(text: &str, hint: &str) -> String {
    if hint.trim().is_empty() {
        text.to_string()
    } else {
        format!("{} (Hint: {})", text, hint)
    }
}

/// Transcript, response log and draft of one chat.
///
/// Responses are index-aligned with the transcript. At most one call is in
/// flight, so the response log is either as long as the transcript or one
/// entry behind it.
#[derive(Debug, Default)]
pub struct ChatSession {
    draft: DraftState,
    transcript: Vec<TranscriptEntry>,
    responses: Vec<SummaryResponse>,
    in_flight: bool,
}

impl ChatSession {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            draft: DraftState {
                dialect,
                ..DraftState::default()
            },
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn responses(&self) -> &[SummaryResponse] {
        &self.responses
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn update_draft_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    pub fn update_draft_hint(&mut self, hint: impl Into<String>) {
        self.draft.hint = hint.into();
    }

    pub fn update_dialect(&mut self, dialect: Dialect) {
        self.draft.dialect = dialect;
    }

    /// Moves the draft into the transcript. `Ok(None)` when the draft text is
    /// blank, in which case nothing changes.
    pub fn begin_submit(&mut self) -> Result<Option<PendingCall>, SessionError> {
        if self.draft.text.trim().is_empty() {
            return Ok(None);
        }
        if self.in_flight {
            return Err(SessionError::Busy);
        }

        let question = compose_question(&self.draft.text, &self.draft.hint);
        self.draft.text.clear();
        self.draft.hint.clear();

        Ok(Some(self.push_question(question)))
    }

    /// Re-asks the question at `index` as a new transcript entry. The stored
    /// text is sent as-is, with whatever hint was folded into it originally.
    pub fn begin_redo(&mut self, index: usize) -> Result<PendingCall, SessionError> {
        let question = self
            .transcript
            .get(index)
            .map(|entry| entry.text.clone())
            .ok_or(SessionError::UnknownEntry(index))?;
        if self.in_flight {
            return Err(SessionError::Busy);
        }

        Ok(self.push_question(question))
    }

    fn push_question(&mut self, question: String) -> PendingCall {
        self.transcript.push(TranscriptEntry {
            text: question.clone(),
            submitted_at: Utc::now(),
        });
        self.in_flight = true;

        PendingCall {
            index: self.transcript.len() - 1,
            question,
            dialect: self.draft.dialect,
        }
    }

    /// Records the outcome of `call`; failures become `{"error": message}`.
    pub fn settle(
        &mut self,
        call: &PendingCall,
        result: Result<SummaryResponse, SummarizeError>,
    ) -> &SummaryResponse {
        debug_assert_eq!(call.index, self.responses.len());

        let response = result.unwrap_or_else(|e| SummaryResponse::failure(e.to_string()));
        self.responses.push(response);
        self.in_flight = false;

        &self.responses[call.index]
    }

    /// Question and answer at `index`, for feedback.
    pub fn exchange(&self, index: usize) -> Result<(&TranscriptEntry, &SummaryResponse), SessionError> {
        let response = self
            .responses
            .get(index)
            .ok_or(SessionError::NoResponse(index))?;
        let entry = self
            .transcript
            .get(index)
            .ok_or(SessionError::UnknownEntry(index))?;
        Ok((entry, response))
    }
}
