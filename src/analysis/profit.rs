use arrow::{
    array::{Array, ArrayRef, AsArray},
    compute::{cast, kernels::numeric::sub, take},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::info;

use super::{descending_order, DerivedTable};
use crate::error::Result;
use crate::table::{columns, Amount, MovieTable};

pub const PROFIT: &str = "profit";
/// Rows kept in the persisted ranking.
pub const TOP_PROFIT_ROWS: usize = 10;
/// Rows echoed in the run report.
pub const PROFIT_LEADERS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieProfit {
    pub title: Option<String>,
    pub profit: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfitRanking {
    /// `original_title, budget, revenue, profit`, best first.
    pub table: DerivedTable,
    pub leaders: Vec<MovieProfit>,
}

/// `revenue - budget` per row; null when either side is null.
/// Mixed integer/float inputs are compared as floats.
pub fn profit_column(table: &MovieTable) -> Result<ArrayRef> {
    let revenue = table.column(columns::REVENUE)?;
    let budget = table.column(columns::BUDGET)?;
    if revenue.data_type() == budget.data_type() {
        Ok(sub(revenue, budget)?)
    } else {
        let revenue = cast(revenue, &DataType::Float64)?;
        let budget = cast(budget, &DataType::Float64)?;
        Ok(sub(&revenue, &budget)?)
    }
}

/// The ten most profitable movies. Fewer rows in, fewer rows out.
pub fn top_profits(table: &MovieTable, name: &str) -> Result<ProfitRanking> {
    table.ensure_not_empty("profitability ranking")?;
    let profit = profit_column(table)?;
    let order = descending_order(&profit, Some(TOP_PROFIT_ROWS))?;

    let mut fields = Vec::with_capacity(4);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(4);
    for (field_name, source) in [
        (columns::TITLE, table.column(columns::TITLE)?),
        (columns::BUDGET, table.column(columns::BUDGET)?),
        (columns::REVENUE, table.column(columns::REVENUE)?),
        (PROFIT, &profit),
    ] {
        fields.push(Field::new(field_name, source.data_type().clone(), true));
        arrays.push(take(source.as_ref(), &order, None)?);
    }
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;

    let titles = batch.column(0).as_string::<i32>();
    let leaders = (0..batch.num_rows().min(PROFIT_LEADERS))
        .map(|i| MovieProfit {
            title: (!titles.is_null(i)).then(|| titles.value(i).to_string()),
            profit: Amount::at(batch.column(3), i),
        })
        .collect();

    info!(rows = batch.num_rows(), artifact = name, "profit ranking built");
    Ok(ProfitRanking {
        table: DerivedTable::new(name, batch),
        leaders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::table_from_lines;
    use arrow::datatypes::Int64Type;

    fn line(i: usize, budget: i64, revenue: i64) -> String {
        format!("{i},M{i},x,d,g,1/1/15,7.0,2015,{budget},{revenue}")
    }

    #[test]
    fn test_top_ten_non_increasing() {
        let lines: Vec<String> = (0..14)
            .map(|i| line(i, 100, (i as i64 * 37) % 11 * 1000))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let table = table_from_lines(&refs);

        let ranking = top_profits(&table, "top_profit_movies").unwrap();
        let batch = &ranking.table.batch;
        assert_eq!(batch.num_rows(), TOP_PROFIT_ROWS);

        let schema = batch.schema();
        let names: Vec<&str> = schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, vec!["original_title", "budget", "revenue", "profit"]);

        let profit = batch.column(3).as_primitive::<Int64Type>();
        for i in 0..batch.num_rows() - 1 {
            assert!(profit.value(i) >= profit.value(i + 1));
        }
        assert_eq!(ranking.leaders.len(), PROFIT_LEADERS);
        assert_eq!(ranking.leaders[0].profit, Some(Amount::Int(profit.value(0))));
    }

    #[test]
    fn test_fewer_than_ten_rows() {
        let l0 = line(0, 50, 10);
        let l1 = line(1, 10, 100);
        let table = table_from_lines(&[l0.as_str(), l1.as_str(), "2,M2,x,d,g,1/1/15,7.0,2015,,100"]);

        let ranking = top_profits(&table, "top_profit_movies").unwrap();
        assert_eq!(ranking.table.num_rows(), 3);
        assert_eq!(
            ranking.leaders,
            vec![
                MovieProfit {
                    title: Some("M1".into()),
                    profit: Some(Amount::Int(90)),
                },
                MovieProfit {
                    title: Some("M0".into()),
                    profit: Some(Amount::Int(-40)),
                },
                MovieProfit {
                    title: Some("M2".into()),
                    profit: None,
                },
            ]
        );
    }

    #[test]
    fn test_mixed_precision_profit_is_float() {
        let table = table_from_lines(&["0,A,x,d,g,1/1/15,7.0,2015,10,20.5"]);
        let profit = profit_column(&table).unwrap();
        assert_eq!(profit.data_type(), &DataType::Float64);
        assert_eq!(Amount::at(&profit, 0), Some(Amount::Float(10.5)));
    }
}
