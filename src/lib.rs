pub mod analysis;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod reconcile;
pub mod sink;
pub mod table;

pub use config::{OutputFormat, PipelineConfig};
pub use error::{AnalysisError, Result};
pub use pipeline::{Pipeline, RunReport};
