//! Durable thumbs up/down feedback.
//!
//! Records are kept in a JSON Lines file that is only ever appended to.
//! Each record is serialized to a single line and written with one
//! `write_all` while the store lock is held, so concurrent writers never
//! interleave or drop each other's entries.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::summarize::models::SummaryResponse;

/// File name offered when the feedback list is downloaded.
pub const EXPORT_FILE_NAME: &str = "feedback.json";

#[derive(Debug)]
pub enum FeedbackError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Closed,
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackError::Io(e) => write!(f, "Feedback store I/O error: {}", e),
            FeedbackError::Serialization(e) => write!(f, "Feedback serialization error: {}", e),
            FeedbackError::Closed => f.write_str("Feedback store is closed"),
        }
    }
}

impl Error for FeedbackError {}

impl From<std::io::Error> for FeedbackError {
    fn from(e: std::io::Error) -> Self {
        FeedbackError::Io(e)
    }
}

impl From<serde_json::Error> for FeedbackError {
    fn from(e: serde_json::Error) -> Self {
        FeedbackError::Serialization(e)
    }
}

/// Thumbs down is stored as `0`, thumbs up as `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Vote {
    Down,
    Up,
}

impl From<Vote> for u8 {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Down => 0,
            Vote::Up => 1,
        }
    }
}

impl TryFrom<u8> for Vote {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Vote::Down),
            1 => Ok(Vote::Up),
            other => Err(format!("feedback must be 0 or 1, got {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub user_input: String,
    pub backend_output: SummaryResponse,
    pub feedback: Vote,
    pub user_name: String,
    pub time: String,
}

impl FeedbackRecord {
    pub fn new(
        user_input: String,
        backend_output: SummaryResponse,
        feedback: Vote,
        user_name: String,
    ) -> Self {
        Self {
            user_input,
            backend_output,
            feedback,
            user_name,
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

struct StoreInner {
    file: Option<File>,
    count: usize,
}

pub struct FeedbackStore {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

impl FeedbackStore {
    /// Opens (creating if needed) the feedback file for appending.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FeedbackError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating feedback directory: {}", parent.display());
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        let count = read_records(&path).await?.len();
        info!(
            "Opened feedback store at {} ({} existing records)",
            path.display(),
            count
        );

        Ok(Self {
            path,
            inner: Mutex::new(StoreInner {
                file: Some(file),
                count,
            }),
        })
    }

    pub async fn append(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut inner = self.inner.lock().await;
        let file = inner.file.as_mut().ok_or(FeedbackError::Closed)?;
        file.write_all(&line).await?;
        file.flush().await?;
        inner.count += 1;

        debug!(
            "Appended feedback record #{} (vote {:?})",
            inner.count, record.feedback
        );
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.count
    }

    /// Every record in append order.
    pub async fn export(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        // Hold the lock so no append lands half-way through the read
        let _inner = self.inner.lock().await;
        read_records(&self.path).await
    }

    /// The export as the JSON array written to `feedback.json`.
    pub async fn export_json(&self) -> Result<String, FeedbackError> {
        let records = self.export().await?;
        Ok(serde_json::to_string(&records)?)
    }

    /// Flushes and syncs the file. Later appends fail with `Closed`.
    pub async fn close(&self) -> Result<(), FeedbackError> {
        let mut inner = self.inner.lock().await;
        if let Some(mut file) = inner.file.take() {
            file.flush().await?;
            file.sync_all().await?;
            info!("Closed feedback store at {}", self.path.display());
        }
        Ok(())
    }
}

async fn read_records(path: &Path) -> Result<Vec<FeedbackRecord>, FeedbackError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<FeedbackRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                "Skipping malformed feedback line {} in {}: {}",
                line_no + 1,
                path.display(),
                e
            ),
        }
    }
    Ok(records)
}
