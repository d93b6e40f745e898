//! Error types for the analysis pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while loading, cleaning, analysing or persisting.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The source dataset could not be fetched.
    #[error("retrieval error: {message}")]
    Retrieval {
        /// Description of the retrieval failure.
        message: String,
    },

    /// A cell did not match its expected format. Recovered at row level.
    #[error("parse error: {value:?} does not match {format}")]
    Parse {
        /// The offending raw value.
        value: String,
        /// The format it was parsed against.
        format: &'static str,
    },

    /// A required column is missing, has the wrong type, or the table is empty.
    #[error("data shape error: {message}")]
    DataShape {
        /// Description of the shape mismatch.
        message: String,
    },

    /// An artifact could not be read or written.
    #[error("io error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is malformed.
    #[error("config error: {message}")]
    Config {
        /// Description of the config failure.
        message: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl AnalysisError {
    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::DataShape {
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
