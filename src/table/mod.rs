// src/table/mod.rs
//! In-memory movie table: an Arrow `RecordBatch` whose required columns are
//! typed and validated once at load. Every other source column rides along as
//! `Utf8` in source order.

pub mod amount;
pub mod convert;
pub mod raw;

use arrow::{
    array::{
        Array, ArrayRef, AsArray, Date32Array, Float64Array, Int64Array, StringArray,
        StringBuilder, UInt32Builder,
    },
    compute::take_record_batch,
    datatypes::{DataType, Date32Type, Field, Float64Type, Int64Type, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use std::{path::Path, sync::Arc};
use tracing::info;

pub use amount::Amount;
pub use raw::{load_raw_csv, read_raw_csv, RawTable};

use crate::error::{AnalysisError, Result};

/// Separator inside the multi-valued `cast` and `genres` cells.
pub const MULTI_VALUE_DELIMITER: char = '|';

pub mod columns {
    pub const TITLE: &str = "original_title";
    pub const RELEASE_DATE: &str = "release_date";
    pub const RELEASE_YEAR: &str = "release_year";
    pub const VOTE_AVERAGE: &str = "vote_average";
    pub const REVENUE: &str = "revenue";
    pub const BUDGET: &str = "budget";
    pub const DIRECTOR: &str = "director";
    pub const CAST: &str = "cast";
    pub const GENRES: &str = "genres";
}

pub const REQUIRED_COLUMNS: [&str; 9] = [
    columns::RELEASE_DATE,
    columns::RELEASE_YEAR,
    columns::VOTE_AVERAGE,
    columns::REVENUE,
    columns::BUDGET,
    columns::DIRECTOR,
    columns::CAST,
    columns::GENRES,
    columns::TITLE,
];

/// Accepted Arrow types for each required column. `release_date` is text until reconciled.
fn accepts(column: &str, dt: &DataType) -> bool {
    match column {
        columns::RELEASE_DATE => matches!(dt, DataType::Utf8 | DataType::Date32),
        columns::RELEASE_YEAR => *dt == DataType::Int64,
        columns::VOTE_AVERAGE => *dt == DataType::Float64,
        columns::REVENUE | columns::BUDGET => matches!(dt, DataType::Int64 | DataType::Float64),
        _ => *dt == DataType::Utf8,
    }
}

/// Splits a multi-valued cell into its non-empty values.
pub fn split_multi(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(MULTI_VALUE_DELIMITER).filter(|t| !t.is_empty())
}

pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

/// One row of the table, typed. Multi-valued fields are lists.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title: Option<String>,
    /// `None` until dates are reconciled, or when unparseable.
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i64>,
    pub vote_average: Option<f64>,
    pub revenue: Option<Amount>,
    pub budget: Option<Amount>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MovieTable {
    batch: RecordBatch,
}

impl MovieTable {
    /// Wraps `batch`, failing with `DataShape` if a required column is absent or mistyped.
    pub fn try_new(batch: RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| schema.field_with_name(c).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::data_shape(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }
        for name in REQUIRED_COLUMNS {
            let field = schema.field_with_name(name)?;
            if !accepts(name, field.data_type()) {
                return Err(AnalysisError::data_shape(format!(
                    "column {} has unexpected type {}",
                    name,
                    field.data_type()
                )));
            }
        }
        Ok(Self { batch })
    }

    /// Types the required columns of a raw table; others stay text.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| raw.column_index(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::data_shape(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut fields = Vec::with_capacity(raw.headers.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(raw.headers.len());
        for (i, name) in raw.headers.iter().enumerate() {
            let dtype = match name.as_str() {
                columns::RELEASE_YEAR => DataType::Int64,
                columns::VOTE_AVERAGE => DataType::Float64,
                columns::REVENUE | columns::BUDGET => convert::infer_amount_dtype(raw, i),
                _ => DataType::Utf8,
            };
            let array = match dtype {
                DataType::Int64 => convert::to_int64(raw, i),
                DataType::Float64 => convert::to_float64(raw, i),
                _ => convert::to_utf8(raw, i),
            };
            fields.push(Field::new(name, dtype, true));
            arrays.push(array);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Self::try_new(batch)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn ensure_not_empty(&self, operation: &str) -> Result<()> {
        if self.batch.num_rows() == 0 {
            return Err(AnalysisError::data_shape(format!(
                "{} needs at least one row, table is empty",
                operation
            )));
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| AnalysisError::data_shape(format!("missing column {}", name)))
    }

    pub fn strings(&self, name: &str) -> Result<&StringArray> {
        self.column(name)?
            .as_string_opt::<i32>()
            .ok_or_else(|| AnalysisError::data_shape(format!("column {} is not text", name)))
    }

    pub fn release_dates(&self) -> Result<&Date32Array> {
        self.column(columns::RELEASE_DATE)?
            .as_primitive_opt::<Date32Type>()
            .ok_or_else(|| AnalysisError::data_shape("release_date has not been reconciled"))
    }

    pub fn release_years(&self) -> Result<&Int64Array> {
        self.column(columns::RELEASE_YEAR)?
            .as_primitive_opt::<Int64Type>()
            .ok_or_else(|| AnalysisError::data_shape("release_year is not Int64"))
    }

    pub fn vote_averages(&self) -> Result<&Float64Array> {
        self.column(columns::VOTE_AVERAGE)?
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| AnalysisError::data_shape("vote_average is not Float64"))
    }

    /// Swaps one column for `array`, retyping its field. The result must still validate.
    pub(crate) fn replace_column(&mut self, name: &str, array: ArrayRef) -> Result<()> {
        let schema = self.batch.schema();
        let idx = schema.index_of(name)?;
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| {
                if i == idx {
                    Field::new(f.name(), array.data_type().clone(), true)
                } else {
                    f.as_ref().clone()
                }
            })
            .collect();
        let mut arrays = self.batch.columns().to_vec();
        arrays[idx] = array;

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        *self = Self::try_new(batch)?;
        Ok(())
    }

    /// Flatten-by-field: one output row per value of the multi-valued `column`,
    /// other columns replicated. Null cells and empty values produce no rows.
    pub fn explode(&self, column: &str) -> Result<RecordBatch> {
        let values = self.strings(column)?;
        let idx = self.batch.schema().index_of(column)?;

        let mut indices = UInt32Builder::with_capacity(values.len());
        let mut tokens = StringBuilder::new();
        for row in 0..values.len() {
            if values.is_null(row) {
                continue;
            }
            for token in split_multi(values.value(row)) {
                indices.append_value(row as u32);
                tokens.append_value(token);
            }
        }
        let indices = indices.finish();

        let mut arrays = take_record_batch(&self.batch, &indices)?.columns().to_vec();
        arrays[idx] = Arc::new(tokens.finish());
        Ok(RecordBatch::try_new(self.batch.schema(), arrays)?)
    }

    pub fn record(&self, row: usize) -> Result<MovieRecord> {
        if row >= self.num_rows() {
            return Err(AnalysisError::data_shape(format!(
                "row {} out of range for {} rows",
                row,
                self.num_rows()
            )));
        }
        let text = |name: &str| -> Result<Option<String>> {
            let arr = self.strings(name)?;
            Ok((!arr.is_null(row)).then(|| arr.value(row).to_string()))
        };
        let list = |name: &str| -> Result<Vec<String>> {
            let arr = self.strings(name)?;
            Ok(if arr.is_null(row) {
                Vec::new()
            } else {
                split_multi(arr.value(row)).map(str::to_string).collect()
            })
        };
        let years = self.release_years()?;
        let votes = self.vote_averages()?;

        Ok(MovieRecord {
            title: text(columns::TITLE)?,
            release_date: self
                .release_dates()
                .ok()
                .filter(|d| !d.is_null(row))
                .and_then(|d| d.value_as_date(row)),
            release_year: (!years.is_null(row)).then(|| years.value(row)),
            vote_average: (!votes.is_null(row)).then(|| votes.value(row)),
            revenue: Amount::at(self.column(columns::REVENUE)?, row),
            budget: Amount::at(self.column(columns::BUDGET)?, row),
            director: text(columns::DIRECTOR)?,
            cast: list(columns::CAST)?,
            genres: list(columns::GENRES)?,
        })
    }
}

/// Loads the source file and validates its schema. Dates are still raw text.
pub fn load_movies<P: AsRef<Path>>(path: P) -> Result<MovieTable> {
    let raw = load_raw_csv(&path)?;
    let table = MovieTable::from_raw(&raw)?;
    info!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "dataset loaded"
    );
    Ok(table)
}


#[cfg(test)]
mod tests {
    use super::test_support::table_from_lines;
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_raw_types_required_columns() {
        let table = table_from_lines(&[
            "1,Jurassic World,Chris Pratt|Irrfan Khan,Colin Trevorrow,Action|Adventure,6/9/15,6.5,2015,150000000,1513528810",
        ]);
        let schema = table.batch().schema();

        assert_eq!(table.num_columns(), 10);
        assert_eq!(schema.field(0).name(), "id");
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(
            schema.field_with_name("release_year").unwrap().data_type(),
            &DataType::Int64
        );
        assert_eq!(
            schema.field_with_name("revenue").unwrap().data_type(),
            &DataType::Int64
        );
        assert_eq!(
            schema.field_with_name("release_date").unwrap().data_type(),
            &DataType::Utf8
        );
        assert!(table.release_dates().is_err());

        let rec = table.record(0).unwrap();
        assert_eq!(rec.title.as_deref(), Some("Jurassic World"));
        assert_eq!(rec.cast, vec!["Chris Pratt", "Irrfan Khan"]);
        assert_eq!(rec.revenue, Some(Amount::Int(1513528810)));
        assert_eq!(rec.release_date, None);
    }

    #[test]
    fn test_missing_columns_is_data_shape_error() {
        let raw = read_raw_csv(Cursor::new("original_title,cast\nA,B\n")).unwrap();
        let err = MovieTable::from_raw(&raw).unwrap_err();
        match err {
            AnalysisError::DataShape { message } => {
                assert!(message.contains("release_date"));
                assert!(message.contains("genres"));
                assert!(!message.contains("cast,"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_explode_replicates_other_columns() {
        let table = table_from_lines(&[
            "1,A,Tom|Jerry,D1,Drama,1/1/15,7.0,2015,1,2",
            "2,B,,D2,Comedy,1/1/15,7.0,2015,1,2",
            "3,C,Tom,D3,Drama,1/1/15,7.0,2015,1,2",
        ]);

        let exploded = table.explode(columns::CAST).unwrap();
        assert_eq!(exploded.num_rows(), 3);
        assert_eq!(exploded.num_columns(), table.num_columns());

        let cast = exploded
            .column_by_name(columns::CAST)
            .unwrap()
            .as_string::<i32>();
        let titles = exploded
            .column_by_name(columns::TITLE)
            .unwrap()
            .as_string::<i32>();
        let pairs: Vec<(&str, &str)> = (0..exploded.num_rows())
            .map(|i| (titles.value(i), cast.value(i)))
            .collect();
        assert_eq!(pairs, vec![("A", "Tom"), ("A", "Jerry"), ("C", "Tom")]);
    }

    #[test]
    fn test_ensure_not_empty() {
        let table = table_from_lines(&[]);
        assert_eq!(table.num_rows(), 0);
        assert!(matches!(
            table.ensure_not_empty("anything"),
            Err(AnalysisError::DataShape { .. })
        ));
    }
}
