// src/reconcile.rs
//! Repairs `release_date` against the trusted `release_year` column.
//!
//! Raw dates use a two-digit year, so anything before 1970 lands a century
//! late (`"5/1/67"` parses as 2067). The year is rebuilt from `release_year`
//! while month and day are kept.

use arrow::array::{Array, ArrayRef, AsArray, Date32Array};
use arrow::datatypes::DataType;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::table::{columns, days_since_epoch, MovieTable};

pub const RAW_DATE_FORMAT: &str = "%m/%d/%y";
const REBUILT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Counters describing one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub rows: usize,
    /// Raw strings that did not match the format (or were blank).
    pub unparseable: usize,
    pub already_matching: usize,
    pub repaired: usize,
    /// Mismatched rows whose rebuilt date was invalid, or had no year to rebuild from.
    pub failed_repairs: usize,
}

/// Parses `"M/D/YY"`. Two-digit years 00-69 map to 20xx.
pub fn parse_raw_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), RAW_DATE_FORMAT).map_err(|_| AnalysisError::Parse {
        value: raw.to_string(),
        format: RAW_DATE_FORMAT,
    })
}

fn rebuild(parsed: NaiveDate, year: i64) -> Option<NaiveDate> {
    let text = format!("{}-{:02}-{:02}", year, parsed.month(), parsed.day());
    NaiveDate::parse_from_str(&text, REBUILT_DATE_FORMAT).ok()
}

/// Outcome of reconciling a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFix {
    Unparsed,
    Kept(NaiveDate),
    Repaired(NaiveDate),
    Failed,
}

impl DateFix {
    pub fn date(&self) -> Option<NaiveDate> {
        match *self {
            DateFix::Kept(d) | DateFix::Repaired(d) => Some(d),
            DateFix::Unparsed | DateFix::Failed => None,
        }
    }
}

/// Reconciles one parsed date with its trusted year.
pub fn reconcile_date(parsed: Option<NaiveDate>, release_year: Option<i64>) -> DateFix {
    let Some(date) = parsed else {
        // no month/day to reuse
        return DateFix::Unparsed;
    };
    match release_year {
        Some(year) if i64::from(date.year()) == year => DateFix::Kept(date),
        Some(year) => rebuild(date, year).map_or(DateFix::Failed, DateFix::Repaired),
        None => DateFix::Failed,
    }
}

/// A raw date whose parsed year disagrees with `release_year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearMismatch {
    pub row: usize,
    pub raw: String,
    pub parsed: NaiveDate,
    pub release_year: Option<i64>,
}

/// Rows the reconciler would rewrite, read from the raw text column.
pub fn find_year_mismatches(table: &MovieTable) -> Result<Vec<YearMismatch>> {
    let raw = table.strings(columns::RELEASE_DATE)?;
    let years = table.release_years()?;
    Ok(raw
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| {
            let cell = cell?;
            let parsed = parse_raw_date(cell).ok()?;
            let release_year = (!years.is_null(row)).then(|| years.value(row));
            (release_year != Some(i64::from(parsed.year()))).then(|| YearMismatch {
                row,
                raw: cell.to_string(),
                parsed,
                release_year,
            })
        })
        .collect())
}

/// Replaces the `release_date` column with a Date32 column reconciled against
/// `release_year`. Rows never fail the pass; bad ones become null.
/// Running it on an already reconciled table is a no-op.
#[tracing::instrument(level = "info", skip(table), fields(rows = table.num_rows()))]
pub fn reconcile_release_dates(table: &mut MovieTable) -> Result<ReconcileStats> {
    let years = table.release_years()?.clone();
    let dates = table.column(columns::RELEASE_DATE)?.clone();

    let parsed: Vec<Option<NaiveDate>> = match dates.data_type() {
        DataType::Date32 => {
            let arr = dates.as_primitive::<arrow::datatypes::Date32Type>();
            (0..arr.len())
                .map(|i| if arr.is_null(i) { None } else { arr.value_as_date(i) })
                .collect()
        }
        _ => {
            let arr = table.strings(columns::RELEASE_DATE)?;
            arr.iter()
                .enumerate()
                .map(|(row, cell)| {
                    let cell = cell?;
                    match parse_raw_date(cell) {
                        Ok(d) => Some(d),
                        Err(e) => {
                            debug!(row, "{}", e);
                            None
                        }
                    }
                })
                .collect()
        }
    };

    let mut stats = ReconcileStats {
        rows: parsed.len(),
        ..Default::default()
    };
    let fixed: Date32Array = parsed
        .iter()
        .enumerate()
        .map(|(row, p)| {
            let year = (!years.is_null(row)).then(|| years.value(row));
            let fix = reconcile_date(*p, year);
            match fix {
                DateFix::Unparsed => stats.unparseable += 1,
                DateFix::Kept(_) => stats.already_matching += 1,
                DateFix::Repaired(_) => stats.repaired += 1,
                DateFix::Failed => {
                    debug!(row, parsed = ?p, release_year = ?year, "date could not be rebuilt");
                    stats.failed_repairs += 1;
                }
            }
            fix.date().map(days_since_epoch)
        })
        .collect();

    table.replace_column(columns::RELEASE_DATE, Arc::new(fixed) as ArrayRef)?;

    info!(
        unparseable = stats.unparseable,
        repaired = stats.repaired,
        failed = stats.failed_repairs,
        "release dates reconciled"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::table_from_lines;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_raw_date_two_digit_year() {
        assert_eq!(parse_raw_date("6/9/15").unwrap(), ymd(2015, 6, 9));
        assert_eq!(parse_raw_date("12/15/67").unwrap(), ymd(2067, 12, 15));
        assert!(matches!(
            parse_raw_date("2015-06-09"),
            Err(AnalysisError::Parse { .. })
        ));
    }

    #[test]
    fn test_reconcile_date_cases() {
        assert_eq!(
            reconcile_date(Some(ymd(2067, 5, 1)), Some(1967)),
            DateFix::Repaired(ymd(1967, 5, 1))
        );
        assert_eq!(
            reconcile_date(Some(ymd(2015, 6, 9)), Some(2015)),
            DateFix::Kept(ymd(2015, 6, 9))
        );
        assert_eq!(reconcile_date(None, Some(2015)), DateFix::Unparsed);
        // 29 Feb does not exist in 1966
        assert_eq!(
            reconcile_date(Some(ymd(2064, 2, 29)), Some(1966)),
            DateFix::Failed
        );
        assert_eq!(reconcile_date(Some(ymd(2015, 6, 9)), None), DateFix::Failed);
    }

    #[test]
    fn test_reconcile_release_dates_column() {
        let mut table = table_from_lines(&[
            "1,A,x,d,g,5/1/67,7.0,1967,1,2",
            "2,B,x,d,g,6/9/15,7.0,2015,1,2",
            "3,C,x,d,g,not a date,7.0,2001,1,2",
            "4,D,x,d,g,,7.0,2001,1,2",
        ]);

        let stats = reconcile_release_dates(&mut table).unwrap();
        assert_eq!(
            stats,
            ReconcileStats {
                rows: 4,
                unparseable: 2,
                already_matching: 1,
                repaired: 1,
                failed_repairs: 0,
            }
        );

        let dates = table.release_dates().unwrap();
        assert_eq!(dates.value_as_date(0), Some(ymd(1967, 5, 1)));
        assert_eq!(dates.value_as_date(1), Some(ymd(2015, 6, 9)));
        assert!(dates.is_null(2));
        assert!(dates.is_null(3));

        let years = table.release_years().unwrap();
        for row in 0..2 {
            assert_eq!(
                i64::from(dates.value_as_date(row).unwrap().year()),
                years.value(row)
            );
        }
    }

    #[test]
    fn test_find_year_mismatches() {
        let table = table_from_lines(&[
            "1,A,x,d,g,5/1/67,7.0,1967,1,2",
            "2,B,x,d,g,6/9/15,7.0,2015,1,2",
            "3,C,x,d,g,bad,7.0,2001,1,2",
        ]);
        let found = find_year_mismatches(&table).unwrap();
        assert_eq!(
            found,
            vec![YearMismatch {
                row: 0,
                raw: "5/1/67".into(),
                parsed: ymd(2067, 5, 1),
                release_year: Some(1967),
            }]
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut table = table_from_lines(&["1,A,x,d,g,5/1/67,7.0,1967,1,2"]);
        reconcile_release_dates(&mut table).unwrap();
        let first = table.release_dates().unwrap().clone();

        let stats = reconcile_release_dates(&mut table).unwrap();
        assert_eq!(stats.already_matching, 1);
        assert_eq!(table.release_dates().unwrap(), &first);
    }
}
