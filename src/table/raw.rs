use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};

#[derive(Debug)]
pub struct RawTable {
    /// Column names, from the header row of the file.
    pub headers: Vec<String>,
    /// Each data row, as a Vec of Strings (one per header).
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Reads a delimited file with a header row into memory, in file order.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path).map_err(|e| AnalysisError::io(&path, e))?;
    read_raw_csv(file)
}

/// Same as [`load_raw_csv`] over any reader. Ragged rows are padded or cut to the header width.
pub fn read_raw_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut ragged = 0usize;
    for result in rdr.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() != width {
            ragged += 1;
            row.resize(width, String::new());
        }
        rows.push(row);
    }

    if ragged > 0 {
        warn!(ragged, width, "rows with unexpected field count were padded or truncated");
    }
    debug!(rows = rows.len(), columns = width, "raw table read");

    Ok(RawTable { headers, rows })
}
