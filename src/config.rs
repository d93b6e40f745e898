// src/config.rs

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{AnalysisError, Result};

/// Where the TMDB dataset lives upstream.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/yinghaoz1/tmdb-movie-dataset-analysis/master/tmdb-movies.csv";

/// On-disk format used by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Fixed names of the four persisted artifacts (without extension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactNames {
    pub movies_by_date: String,
    pub high_rated: String,
    pub top_profit: String,
    pub genre_counts: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            movies_by_date: "movies_by_date".into(),
            high_rated: "high_rated_movies".into(),
            top_profit: "top_profit_movies".into(),
            genre_counts: "genre_counts".into(),
        }
    }
}

impl ArtifactNames {
    pub fn all(&self) -> [&str; 4] {
        [
            &self.genre_counts,
            &self.movies_by_date,
            &self.high_rated,
            &self.top_profit,
        ]
    }
}

/// Everything the pipeline needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source CSV; the download target when `download` is set.
    pub input_path: PathBuf,
    /// Directory receiving the derived artifacts.
    pub output_dir: PathBuf,
    pub source_url: Option<String>,
    /// Fetch `source_url` into `input_path` before loading.
    pub download: bool,
    pub format: OutputFormat,
    pub artifacts: ArtifactNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("movies.csv"),
            output_dir: PathBuf::from("data"),
            source_url: Some(DEFAULT_SOURCE_URL.to_string()),
            download: true,
            format: OutputFormat::Csv,
            artifacts: ArtifactNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML config; missing keys fall back to the defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_yaml_str(&text).map_err(|e| AnalysisError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// `<output_dir>/<name>.<ext>` for the configured format.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", name, self.format.extension()))
    }
}
