use arrow::{array::ArrayRef, compute::take_record_batch};
use std::sync::Arc;
use tracing::info;

use super::{descending_order, DerivedTable};
use crate::error::Result;
use crate::table::MovieTable;

/// Full table ordered by release date, newest first. Null dates go last.
pub fn sort_by_release_date(table: &MovieTable, name: &str) -> Result<DerivedTable> {
    table.ensure_not_empty("release-date ordering")?;
    let dates: ArrayRef = Arc::new(table.release_dates()?.clone());

    let order = descending_order(&dates, None)?;
    let sorted = take_record_batch(table.batch(), &order)?;

    info!(rows = sorted.num_rows(), artifact = name, "sorted by release date");
    Ok(DerivedTable::new(name, sorted))
}
