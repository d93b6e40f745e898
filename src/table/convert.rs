use arrow::{
    array::{ArrayRef, Float64Builder, Int64Builder, StringArray},
    datatypes::DataType,
};
use std::sync::Arc;
use tracing::debug;

use super::raw::RawTable;

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn cells<'a>(raw: &'a RawTable, col: usize) -> impl Iterator<Item = Option<&'a str>> + 'a {
    raw.rows.iter().map(move |row| {
        let s = clean_str(&row[col]);
        (!s.is_empty()).then_some(s)
    })
}

/// Pick Int64 when every non-empty cell parses as an integer, Float64 otherwise.
pub fn infer_amount_dtype(raw: &RawTable, col: usize) -> DataType {
    if cells(raw, col).flatten().all(|s| s.parse::<i64>().is_ok()) {
        DataType::Int64
    } else {
        DataType::Float64
    }
}

/// Text column, kept verbatim; blank cells become null.
pub fn to_utf8(raw: &RawTable, col: usize) -> ArrayRef {
    let arr: StringArray = raw
        .rows
        .iter()
        .map(|row| (!row[col].trim().is_empty()).then_some(row[col].as_str()))
        .collect();
    Arc::new(arr)
}

pub fn to_int64(raw: &RawTable, col: usize) -> ArrayRef {
    let mut b = Int64Builder::with_capacity(raw.rows.len());
    for (row, cell) in cells(raw, col).enumerate() {
        let v = cell.and_then(|s| match s.parse::<i64>() {
            Ok(v) => Some(v),
            // "1967.0" style exports
            Err(_) => s
                .parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64),
        });
        if v.is_none() && cell.is_some() {
            debug!(column = %raw.headers[col], row, value = ?cell, "not an integer, loaded as null");
        }
        b.append_option(v);
    }
    Arc::new(b.finish())
}

pub fn to_float64(raw: &RawTable, col: usize) -> ArrayRef {
    let mut b = Float64Builder::with_capacity(raw.rows.len());
    for (row, cell) in cells(raw, col).enumerate() {
        let v = cell.and_then(|s| s.parse::<f64>().ok()).filter(|f| !f.is_nan());
        if v.is_none() && cell.is_some() {
            debug!(column = %raw.headers[col], row, value = ?cell, "not a number, loaded as null");
        }
        b.append_option(v);
    }
    Arc::new(b.finish())
}
