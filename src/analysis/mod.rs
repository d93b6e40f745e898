// src/analysis/mod.rs
//! The seven derivations over a reconciled [`MovieTable`]. None of them
//! mutate the table; each either builds a [`DerivedTable`] or a summary.

pub mod genres;
pub mod people;
pub mod profit;
pub mod ratings;
pub mod release_dates;
pub mod revenue;

use arrow::{
    array::{ArrayRef, UInt32Array},
    compute::{lexsort_to_indices, SortColumn, SortOptions},
    record_batch::RecordBatch,
};
use std::{collections::HashMap, sync::Arc};

use crate::error::Result;

pub use genres::{genre_counts, GenreCounts};
pub use people::{people_frequency, Frequency, PeopleSummary};
pub use profit::{top_profits, MovieProfit, ProfitRanking};
pub use ratings::{high_rated, HighRated, HIGH_RATING_THRESHOLD};
pub use release_dates::sort_by_release_date;
pub use revenue::{revenue_extremes, total_revenue, RevenueExtremes};

/// An output table with a fixed schema, written under `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub name: String,
    pub batch: RecordBatch,
}

impl DerivedTable {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }
}

/// Row order for a descending sort on `values`: nulls last, ties keep table order.
pub(crate) fn descending_order(values: &ArrayRef, limit: Option<usize>) -> Result<UInt32Array> {
    let row_order: ArrayRef = Arc::new(UInt32Array::from_iter_values(0..values.len() as u32));
    let columns = [
        SortColumn {
            values: values.clone(),
            options: Some(SortOptions {
                descending: true,
                nulls_first: false,
            }),
        },
        SortColumn {
            values: row_order,
            options: Some(SortOptions {
                descending: false,
                nulls_first: false,
            }),
        },
    ];
    Ok(lexsort_to_indices(&columns, limit)?)
}

/// Counts tokens, most frequent first. Equal counts keep first-seen order.
pub fn value_counts<'a, I>(tokens: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut slot: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for token in tokens {
        match slot.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(token, counts.len());
                counts.push((token.to_string(), 1));
            }
        }
    }
    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;

    #[test]
    fn test_value_counts_ties_keep_first_seen() {
        let counts = value_counts(["Drama", "Comedy", "Action", "Comedy", "Drama", "Horror"]);
        assert_eq!(
            counts,
            vec![
                ("Drama".to_string(), 2),
                ("Comedy".to_string(), 2),
                ("Action".to_string(), 1),
                ("Horror".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_descending_order_nulls_last_stable() {
        let values: ArrayRef = Arc::new(Int64Array::from(vec![
            Some(3),
            None,
            Some(5),
            Some(3),
            None,
        ]));
        let order = descending_order(&values, None).unwrap();
        assert_eq!(order.values().to_vec(), vec![2, 0, 3, 1, 4]);

        let top = descending_order(&values, Some(2)).unwrap();
        assert_eq!(top.values().to_vec(), vec![2, 0]);
    }
}
