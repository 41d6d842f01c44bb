use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Target database flavour sent to the summarization service as `db_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    Mysql,
    Aurora,
    Redshift,
    Athena,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Sqlite,
        Dialect::Postgres,
        Dialect::Mysql,
        Dialect::Aurora,
        Dialect::Redshift,
        Dialect::Athena,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Aurora => "aurora",
            Dialect::Redshift => "redshift",
            Dialect::Athena => "athena",
        }
    }

    /// Name shown in the dialect selector.
    pub fn label(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "SQLite",
            Dialect::Postgres => "PostgreSQL",
            Dialect::Mysql => "MySQL",
            Dialect::Aurora => "Aurora",
            Dialect::Redshift => "Redshift",
            Dialect::Athena => "Athena",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDialect(pub String);

impl fmt::Display for UnknownDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown database dialect: {}", self.0)
    }
}

impl std::error::Error for UnknownDialect {}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

// Body of the outbound summarize call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarizeRequest {
    pub question: String,
    pub db_type: Dialect,
}

/// Whatever JSON the service returned, or a locally built `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryResponse(pub Value);

impl SummaryResponse {
    const DISPLAY_FIELDS: [&'static str; 4] = ["summary", "answer", "message", "error"];

    pub fn failure(message: impl Into<String>) -> Self {
        SummaryResponse(serde_json::json!({ "error": message.into() }))
    }

    /// Text for the response bubble: the first usable field of
    /// `summary`, `answer`, `message`, `error`, else the whole JSON.
    pub fn display_text(&self) -> String {
        for field in Self::DISPLAY_FIELDS {
            match self.0.get(field) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => continue,
                Some(Value::String(s)) if s.is_empty() => continue,
                Some(Value::String(s)) => return s.clone(),
                Some(other) => return other.to_string(),
            }
        }
        self.0.to_string()
    }

    /// True when the bubble shows an error rather than an answer.
    pub fn is_error(&self) -> bool {
        let has = |field: &str| match self.0.get(field) {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | Some(Value::Bool(false)) | None => false,
            Some(_) => true,
        };
        has("error") && !has("summary") && !has("answer") && !has("message")
    }
}
