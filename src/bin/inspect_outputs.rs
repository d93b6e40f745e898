use anyhow::{Context, Result};
use arrow::{array::Array, record_batch::RecordBatch, util::display::array_value_to_string};
use movie_analysis::{sink, PipelineConfig};
use std::{env, path::Path, process::exit};

/// Rows shown per artifact.
const HEAD_ROWS: usize = 10;

fn main() {
    // Optional CLI argument: path to a YAML config.
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [CONFIG_PATH]", args[0]);
        exit(1);
    }
    if let Err(e) = run(args.get(1).map(String::as_str)) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Schema, then the first rows, one `column=value` pair per cell.
fn print_head(path: &Path, batch: &RecordBatch) -> Result<()> {
    println!("File: {}", path.display());
    println!("Rows: {}", batch.num_rows());

    // 1) schema
    println!("Schema:");
    for (i, field) in batch.schema().fields().iter().enumerate() {
        println!(
            "  {:>2}: {} ({}, nullable={})",
            i,
            field.name(),
            field.data_type(),
            field.is_nullable()
        );
    }

    // 2) leading rows
    let schema = batch.schema();
    for row in 0..batch.num_rows().min(HEAD_ROWS) {
        let cells = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, column)| {
                let value = if column.is_null(row) {
                    "null".to_string()
                } else {
                    array_value_to_string(column, row)?
                };
                Ok(format!("{}={}", field.name(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        println!("  [{}] {}", row, cells.join(", "));
    }
    Ok(())
}

/// Reload every persisted artifact and print its first rows.
fn run(config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path))?,
        None => PipelineConfig::default(),
    };

    for name in config.artifacts.all() {
        let path = config.artifact_path(name);
        if !path.exists() {
            println!("{}: not found", path.display());
            println!();
            continue;
        }

        let schema = sink::infer_schema(&path, config.format)
            .with_context(|| format!("inferring schema of {}", path.display()))?;
        let batch = sink::read_table(&path, schema, config.format)
            .with_context(|| format!("reading {}", path.display()))?;
        print_head(&path, &batch)?;
        println!();
    }
    Ok(())
}
