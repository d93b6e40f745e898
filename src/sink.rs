// src/sink.rs
//! Persists derived tables as flat files and reads them back.

use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder, WriterBuilder},
    datatypes::SchemaRef,
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

use crate::analysis::DerivedTable;
use crate::config::OutputFormat;
use crate::error::{AnalysisError, Result};

fn write_csv(batch: &RecordBatch, file: File) -> Result<()> {
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(())
}

fn write_parquet(batch: &RecordBatch, file: File) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Writes `table` to `<dir>/<name>.<ext>`, replacing any previous artifact.
/// Column and row order are written exactly as held.
#[tracing::instrument(level = "info", skip(table, dir), fields(artifact = %table.name))]
pub fn write_table<P: AsRef<Path>>(
    table: &DerivedTable,
    dir: P,
    format: OutputFormat,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;

    let path = dir.join(format!("{}.{}", table.name, format.extension()));
    let tmp_path = dir.join(format!(".{}.{}.tmp", table.name, format.extension()));

    let file = File::create(&tmp_path).map_err(|e| AnalysisError::io(&tmp_path, e))?;
    let written = match format {
        OutputFormat::Csv => write_csv(&table.batch, file),
        OutputFormat::Parquet => write_parquet(&table.batch, file),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, &path).map_err(|e| AnalysisError::io(&path, e))?;
    info!(rows = table.num_rows(), path = %path.display(), "saved");
    Ok(path)
}

/// Loads an artifact written by [`write_table`]. CSV needs `schema` to type its
/// columns; Parquet carries its own and must match it.
pub fn read_table<P: AsRef<Path>>(
    path: P,
    schema: SchemaRef,
    format: OutputFormat,
) -> Result<RecordBatch> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;

    let batches = match format {
        OutputFormat::Csv => ReaderBuilder::new(schema.clone())
            .with_header(true)
            .build(file)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        OutputFormat::Parquet => {
            let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
            let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
            if let Some(first) = batches.first() {
                if first.schema().fields() != schema.fields() {
                    return Err(AnalysisError::data_shape(format!(
                        "{} does not have the expected schema",
                        path.display()
                    )));
                }
            }
            batches
        }
    };
    debug!(path = %path.display(), batches = batches.len(), "artifact read");

    Ok(concat_batches(&schema, &batches)?)
}

/// Schema of an artifact whose layout is not known up front. CSV types are inferred.
pub fn infer_schema<P: AsRef<Path>>(path: P, format: OutputFormat) -> Result<SchemaRef> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    match format {
        OutputFormat::Csv => {
            let (schema, _) = Format::default()
                .with_header(true)
                .infer_schema(file, None)?;
            Ok(Arc::new(schema))
        }
        OutputFormat::Parquet => Ok(ParquetRecordBatchReaderBuilder::try_new(file)?
            .schema()
            .clone()),
    }
}
