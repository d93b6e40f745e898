// src/fetch.rs

use reqwest::blocking::Client;
use std::{fs, path::Path};
use tracing::info;
use url::Url;

use crate::error::{AnalysisError, Result};

fn retrieval(message: String) -> AnalysisError {
    AnalysisError::Retrieval { message }
}

/// Downloads `source` into `dest`, creating parent directories as needed.
/// Any existing file at `dest` is overwritten.
#[tracing::instrument(level = "info", skip(client, dest), fields(dest = %dest.as_ref().display()))]
pub fn download_dataset<P: AsRef<Path>>(client: &Client, source: &str, dest: P) -> Result<u64> {
    let dest = dest.as_ref();
    let url = Url::parse(source).map_err(|e| retrieval(format!("parsing URL {}: {}", source, e)))?;

    info!("downloading data from {}", url);
    let response = client
        .get(url.clone())
        .send()
        .map_err(|e| retrieval(format!("GET {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(retrieval(format!(
            "failed to download {}: status {}",
            url, status
        )));
    }

    let body = response
        .bytes()
        .map_err(|e| retrieval(format!("reading body from {}: {}", url, e)))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }
    fs::write(dest, &body).map_err(|e| AnalysisError::io(dest, e))?;

    info!(bytes = body.len(), "data downloaded successfully");
    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_retrieval_error() {
        let tmp = tempfile::tempdir().unwrap();
        let client = Client::new();
        let err = download_dataset(&client, "not a url", tmp.path().join("movies.csv"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Retrieval { .. }));
        assert!(!tmp.path().join("movies.csv").exists());
    }
}
