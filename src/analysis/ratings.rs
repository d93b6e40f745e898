use arrow::{
    array::{ArrayRef, Float64Array},
    compute::{filter_record_batch, kernels::cmp::gt, take_record_batch},
};
use tracing::info;

use super::{descending_order, DerivedTable};
use crate::error::{AnalysisError, Result};
use crate::table::{columns, MovieTable};

/// Movies rated strictly above this count as high-rated.
pub const HIGH_RATING_THRESHOLD: f64 = 7.5;

#[derive(Debug, Clone, PartialEq)]
pub struct HighRated {
    pub table: DerivedTable,
    pub count: usize,
}

/// Rows with `vote_average > 7.5`, best rated first. Null ratings are dropped.
pub fn high_rated(table: &MovieTable, name: &str) -> Result<HighRated> {
    table.ensure_not_empty("high-rated filter")?;
    let votes = table.vote_averages()?;

    let mask = gt(votes, &Float64Array::new_scalar(HIGH_RATING_THRESHOLD))?;
    let filtered = filter_record_batch(table.batch(), &mask)?;

    let filtered_votes: &ArrayRef = filtered
        .column_by_name(columns::VOTE_AVERAGE)
        .ok_or_else(|| AnalysisError::data_shape("vote_average lost by filter"))?;
    let order = descending_order(filtered_votes, None)?;
    let sorted = take_record_batch(&filtered, &order)?;

    let count = sorted.num_rows();
    info!(count, artifact = name, "high-rated movies selected");
    Ok(HighRated {
        table: DerivedTable::new(name, sorted),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::table_from_lines;
    use arrow::array::AsArray;
    use arrow::datatypes::Float64Type;

    #[test]
    fn test_high_rated_subset_sorted() {
        let table = table_from_lines(&[
            "1,A,x,d,g,1/1/15,7.5,2015,1,2",
            "2,B,x,d,g,1/1/15,8.1,2015,1,2",
            "3,C,x,d,g,1/1/15,,2015,1,2",
            "4,D,x,d,g,1/1/15,7.6,2015,1,2",
            "5,E,x,d,g,1/1/15,8.1,2015,1,2",
            "6,F,x,d,g,1/1/15,3.0,2015,1,2",
        ]);

        let out = high_rated(&table, "high_rated_movies").unwrap();
        assert_eq!(out.count, 3);
        assert_eq!(out.table.num_rows(), 3);

        let batch = &out.table.batch;
        let votes = batch
            .column_by_name(columns::VOTE_AVERAGE)
            .unwrap()
            .as_primitive::<Float64Type>();
        let titles = batch
            .column_by_name(columns::TITLE)
            .unwrap()
            .as_string::<i32>();

        for i in 0..batch.num_rows() {
            assert!(votes.value(i) > HIGH_RATING_THRESHOLD);
            if i + 1 < batch.num_rows() {
                assert!(votes.value(i) >= votes.value(i + 1));
            }
        }
        let order: Vec<&str> = (0..batch.num_rows()).map(|i| titles.value(i)).collect();
        assert_eq!(order, vec!["B", "E", "D"]);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let table = table_from_lines(&["1,A,x,d,g,1/1/15,5.0,2015,1,2"]);
        let out = high_rated(&table, "high_rated_movies").unwrap();
        assert_eq!(out.count, 0);
        assert_eq!(out.table.batch.schema(), table.batch().schema());
    }
}
