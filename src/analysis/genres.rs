use arrow::{
    array::{ArrayRef, AsArray, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::info;

use super::{value_counts, DerivedTable};
use crate::error::{AnalysisError, Result};
use crate::table::{columns, MovieTable};

pub const GENRE: &str = "genre";
pub const MOVIE_COUNT: &str = "movie_count";
/// Genres echoed in the run report.
pub const GENRE_LEADERS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct GenreCounts {
    /// `genre, movie_count`, most common first.
    pub table: DerivedTable,
    pub counts: Vec<(String, usize)>,
}

/// Occurrences of each genre over the exploded `genres` column.
pub fn genre_counts(table: &MovieTable, name: &str) -> Result<GenreCounts> {
    table.ensure_not_empty("genre frequency")?;

    let exploded = table.explode(columns::GENRES)?;
    let genres = exploded
        .column_by_name(columns::GENRES)
        .ok_or_else(|| AnalysisError::data_shape("genres lost by explode"))?
        .as_string::<i32>();
    let counts = value_counts(genres.iter().flatten());

    let schema = Schema::new(vec![
        Field::new(GENRE, DataType::Utf8, false),
        Field::new(MOVIE_COUNT, DataType::Int64, false),
    ]);
    let names: ArrayRef = Arc::new(StringArray::from_iter_values(
        counts.iter().map(|(g, _)| g.as_str()),
    ));
    let totals: ArrayRef = Arc::new(Int64Array::from_iter_values(
        counts.iter().map(|(_, c)| *c as i64),
    ));
    let batch = RecordBatch::try_new(Arc::new(schema), vec![names, totals])?;

    info!(genres = counts.len(), artifact = name, "genre counts built");
    Ok(GenreCounts {
        table: DerivedTable::new(name, batch),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::table_from_lines;
    use arrow::datatypes::Int64Type;

    #[test]
    fn test_counts_sum_to_tokens_not_rows() {
        let table = table_from_lines(&[
            "1,A,x,d,Action|Adventure|Science Fiction,1/1/15,7.0,2015,1,2",
            "2,B,x,d,Drama|Action,1/1/15,7.0,2015,1,2",
            "3,C,x,d,,1/1/15,7.0,2015,1,2",
            "4,D,x,d,Drama,1/1/15,7.0,2015,1,2",
        ]);

        let out = genre_counts(&table, "genre_counts").unwrap();
        assert_eq!(
            out.counts,
            vec![
                ("Action".to_string(), 2),
                ("Drama".to_string(), 2),
                ("Adventure".to_string(), 1),
                ("Science Fiction".to_string(), 1),
            ]
        );

        let totals = out.table.batch.column(1).as_primitive::<Int64Type>();
        let sum: i64 = totals.values().iter().sum();
        assert_eq!(sum, 6);
        assert_eq!(out.table.batch.schema().field(0).name(), GENRE);
        assert_eq!(out.table.batch.schema().field(1).name(), MOVIE_COUNT);
    }
}
