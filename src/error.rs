//! Error taxonomy for a single year's pipeline run.
//!
//! Each stage has its own error type so callers can tell a missing source
//! apart from markup drift or a rule-set mismatch. [`YearError`] groups them;
//! a failure is always scoped to one year and never aborts a batch.

use thiserror::Error;

/// One failed attempt to retrieve a candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub url: String,
    pub reason: String,
}

/// No candidate URL for the year could be retrieved.
#[derive(Debug, Error)]
#[error("no reachable source for {year} (tried: {})", format_attempts(.attempts))]
pub struct FetchError {
    pub year: i32,
    pub attempts: Vec<FetchAttempt>,
}

impl FetchError {
    /// The URLs that were tried, in order, for manual retry.
    pub fn attempted_urls(&self) -> Vec<String> {
        self.attempts.iter().map(|a| a.url.clone()).collect()
    }
}

fn format_attempts(attempts: &[FetchAttempt]) -> String {
    if attempts.is_empty() {
        return "no candidate URLs".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{} => {}", a.url, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The retrieved document lacks the structure normalization relies on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected structural marker missing from {url}: {marker}")]
    MissingMarker { url: String, marker: String },

    #[error("no content blocks between the title heading and the end marker in {url}")]
    EmptyContent { url: String },
}

/// Extraction produced nothing from a non-empty block sequence.
#[derive(Debug, Error)]
#[error(
    "zero events extracted for {year} from {blocks} blocks ({candidates} candidates); rules or markup need review"
)]
pub struct ExtractionError {
    pub year: i32,
    pub blocks: usize,
    pub candidates: usize,
}

/// Any fatal error for one year's run.
#[derive(Debug, Error)]
pub enum YearError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl YearError {
    /// Short machine-readable label used in logs and the batch report.
    pub fn kind(&self) -> &'static str {
        match self {
            YearError::Fetch(_) => "fetch",
            YearError::Parse(_) => "parse",
            YearError::Extraction(_) => "extraction",
        }
    }

    pub fn attempted_urls(&self) -> Vec<String> {
        match self {
            YearError::Fetch(e) => e.attempted_urls(),
            _ => Vec::new(),
        }
    }
}

/// Configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
