//! Error types shared across the harness.

use std::path::PathBuf;

use crate::registry::RegistryError;
use crate::template::TemplateError;

/// Errors surfaced by feature discovery, execution, and reporting.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HarnessError {
    /// The feature root could not be walked.
    #[error("failed to read feature directory {path}: {source}")]
    Discovery {
        /// Directory the loader attempted to walk.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A feature file failed to parse.
    #[error(transparent)]
    Parse(#[from] gherkin::ParseFileError),
    /// No loaded feature carries the requested URI.
    #[error("feature not found: {0}")]
    FeatureNotFound(String),
    /// The step registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A report sink failed while the strict formatter policy was active.
    #[error("report sink failed: {0}")]
    Sink(#[source] std::io::Error),
    /// The buffered JSON trace could not be serialised.
    #[error("failed to serialise JSON trace: {0}")]
    Json(#[from] serde_json::Error),
    /// A rendered report could not be persisted.
    #[error("failed to write report {path}: {source}")]
    Report {
        /// Path of the report file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The HTML template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
