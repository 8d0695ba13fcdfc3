use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading the external document of a locale.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure: network error, HTTP error status, unreadable file.
    #[error("{locale}: source unavailable: {reason}")]
    Unavailable { locale: String, reason: String },

    /// The document was fetched but the expected field is missing or
    /// unparseable. The page layout most likely changed.
    #[error("{locale}: source format changed, field '{field}': {reason}")]
    FormatChanged {
        locale: String,
        field: &'static str,
        reason: String,
    },

    #[error("{locale}: no document loaded, call update() first")]
    NotLoaded { locale: String },
}

impl SourceError {
    pub fn unavailable(locale: &str, reason: impl ToString) -> Self {
        SourceError::Unavailable {
            locale: locale.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn format_changed(locale: &str, field: &'static str, reason: impl ToString) -> Self {
        SourceError::FormatChanged {
            locale: locale.to_string(),
            field,
            reason: reason.to_string(),
        }
    }
}

/// Failures of the durable stores (series and subscriber files).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: line {line}: bad date '{value}'")]
    BadDate {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("{path}: expected header '{expected}', found '{found}'")]
    BadHeader {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

/// Why one locale failed inside a polling cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Raised after the merge already happened: memory is ahead of disk.
    #[error("persist failed after merge: {0}")]
    Persistence(#[from] StoreError),
}
