//! Error types for loading, aggregation, export and configuration.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Generic remediation shown under every load or aggregation diagnostic.
pub const REMEDIATION_HINT: &str = "Please ensure the dataset is correctly formatted and accessible.";

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column '{column}' could not be read as {expected}: {reason}")]
    Malformed {
        column: String,
        expected: &'static str,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Column '{column}' is not present in the dataset")]
    MissingColumn { column: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl AggregateError {
    pub fn missing(column: &str) -> Self {
        AggregateError::MissingColumn {
            column: column.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to render {chart}: {reason}")]
    Render { chart: String, reason: String },
    #[error("Nothing to export")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything the dashboard can surface to the user.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] DataLoadError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DashboardError {
    /// Single line shown in the error banner.
    pub fn diagnostic(&self) -> String {
        format!("An error occurred: {}", self)
    }

    /// Remediation line shown below the diagnostic, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DashboardError::Load(_) | DashboardError::Aggregate(_) => Some(REMEDIATION_HINT),
            DashboardError::Export(_) | DashboardError::Config(_) => None,
        }
    }
}
