use arrow::{
    array::{Array, AsArray},
    compute::{sum, sum_checked},
    datatypes::{DataType, Float64Type, Int64Type},
};
use std::cmp::Ordering;

use crate::error::{AnalysisError, Result};
use crate::table::{columns, Amount, MovieRecord, MovieTable};

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueExtremes {
    pub highest: MovieRecord,
    pub lowest: MovieRecord,
}

/// Rows holding the largest and smallest revenue. Nulls are skipped and ties
/// go to the first row in table order.
pub fn revenue_extremes(table: &MovieTable) -> Result<RevenueExtremes> {
    table.ensure_not_empty("revenue extremes")?;
    let revenue = table.column(columns::REVENUE)?;

    let mut max: Option<(usize, Amount)> = None;
    let mut min: Option<(usize, Amount)> = None;
    for row in 0..revenue.len() {
        let Some(value) = Amount::at(revenue, row) else {
            continue;
        };
        if max.map_or(true, |(_, m)| value.compare(&m) == Ordering::Greater) {
            max = Some((row, value));
        }
        if min.map_or(true, |(_, m)| value.compare(&m) == Ordering::Less) {
            min = Some((row, value));
        }
    }

    match (max, min) {
        (Some((hi, _)), Some((lo, _))) => Ok(RevenueExtremes {
            highest: table.record(hi)?,
            lowest: table.record(lo)?,
        }),
        _ => Err(AnalysisError::data_shape("revenue column has no values")),
    }
}

/// Sum of the revenue column in its stored precision. Nulls are skipped.
pub fn total_revenue(table: &MovieTable) -> Result<Amount> {
    table.ensure_not_empty("total revenue")?;
    let revenue = table.column(columns::REVENUE)?;

    match revenue.data_type() {
        DataType::Int64 => {
            let total = sum_checked(revenue.as_primitive::<Int64Type>())?;
            Ok(Amount::Int(total.unwrap_or(0)))
        }
        DataType::Float64 => Ok(Amount::Float(
            sum(revenue.as_primitive::<Float64Type>()).unwrap_or(0.0),
        )),
        other => Err(AnalysisError::data_shape(format!(
            "revenue has non-numeric type {}",
            other
        ))),
    }
}
