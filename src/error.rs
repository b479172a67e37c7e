use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// RefreshError – everything that can go wrong while regenerating artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RefreshError {
    /// The version-control diff could not be computed. Fatal for a run.
    #[error("version-control history unavailable: {reason}")]
    HistoryUnavailable { reason: String },

    #[error("summary statistics file missing: {}", path.display())]
    StatsFileMissing { path: PathBuf },

    #[error("malformed summary statistics in {}: {reason}", path.display())]
    MalformedStats { path: PathBuf, reason: String },

    /// No column has a defined correlation with the target.
    #[error("no column of '{dataset}' has a defined correlation with the target")]
    DegenerateCorrelation { dataset: String },

    #[error("failed to fetch dataset '{dataset}': {reason}")]
    FetchFailure { dataset: String, reason: String },

    #[error("malformed dataset table for '{dataset}': {reason}")]
    MalformedData { dataset: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Process exit status of a clean run.
pub const EXIT_OK: u8 = 0;
/// Some dataset, or the catalog step, failed; the run still completed.
pub const EXIT_FAILED: u8 = 1;
/// Change detection failed and nothing was processed.
pub const EXIT_NO_HISTORY: u8 = 2;

impl RefreshError {
    /// Exit status for a run aborted by this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RefreshError::HistoryUnavailable { .. } => EXIT_NO_HISTORY,
            _ => EXIT_FAILED,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RefreshError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RefreshError>;

// ---------------------------------------------------------------------------
// Per-dataset failures
// ---------------------------------------------------------------------------

/// The pipeline stage a dataset failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Readme,
    Write,
    Catalog,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Readme => "readme",
            Stage::Write => "write",
            Stage::Catalog => "catalog",
        };
        f.write_str(name)
    }
}

/// A failure scoped to one dataset (or to the catalog step).
#[derive(Debug, Error)]
#[error("{dataset}: {stage} stage failed: {error}")]
pub struct DatasetFailure {
    pub dataset: String,
    pub stage: Stage,
    #[source]
    pub error: RefreshError,
}

impl DatasetFailure {
    pub fn new(dataset: impl Into<String>, stage: Stage, error: RefreshError) -> Self {
        DatasetFailure {
            dataset: dataset.into(),
            stage,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_dataset_and_stage() {
        let failure = DatasetFailure::new(
            "iris",
            Stage::Fetch,
            RefreshError::FetchFailure {
                dataset: "iris".into(),
                reason: "not cached".into(),
            },
        );
        let msg = failure.to_string();
        assert!(msg.starts_with("iris: fetch stage failed"));
        assert!(msg.contains("not cached"));
    }

    #[test]
    fn aborting_errors_map_to_exit_codes() {
        let history = RefreshError::HistoryUnavailable {
            reason: "no parent revision".into(),
        };
        assert_eq!(history.exit_code(), EXIT_NO_HISTORY);
        let io = RefreshError::io(
            "datasets",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.exit_code(), EXIT_FAILED);
        assert_eq!(RefreshError::Config("bad seed".into()).exit_code(), EXIT_FAILED);
    }

    #[test]
    fn exit_code_survives_anyhow_context() {
        let err = anyhow::Error::from(RefreshError::HistoryUnavailable {
            reason: "not a repository".into(),
        })
        .context("running pipeline");
        let code = err.downcast_ref::<RefreshError>().map_or(EXIT_FAILED, RefreshError::exit_code);
        assert_eq!(code, EXIT_NO_HISTORY);
    }
}
