use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef},
    datatypes::DataType,
};
use movie_analysis::{
    reconcile::find_year_mismatches,
    table::{load_movies, Amount, MovieTable},
    PipelineConfig,
};
use std::{env, process::exit};

/// Mismatched rows shown as a sample.
const SAMPLE_ROWS: usize = 6;

fn main() {
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

/// count, mean, min, max over the non-null values of a numeric column.
fn describe(array: &ArrayRef) -> Option<(usize, f64, Amount, Amount)> {
    let values: Vec<Amount> = (0..array.len())
        .filter_map(|i| Amount::at(array, i))
        .collect();
    let first = *values.first()?;
    let (mut min, mut max, mut total) = (first, first, 0.0);
    for v in &values {
        if v.compare(&min).is_lt() {
            min = *v;
        }
        if v.compare(&max).is_gt() {
            max = *v;
        }
        total += v.as_f64();
    }
    Some((values.len(), total / values.len() as f64, min, max))
}

fn print_info(table: &MovieTable) {
    let batch = table.batch();
    println!("{} rows, {} columns", batch.num_rows(), batch.num_columns());
    println!("{:<24} {:>10} {:>10}", "column", "type", "nulls");
    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        println!(
            "{:<24} {:>10} {:>10}",
            field.name(),
            field.data_type().to_string(),
            column.null_count()
        );
    }
    println!();

    println!(
        "{:<24} {:>8} {:>18} {:>18} {:>18}",
        "column", "count", "mean", "min", "max"
    );
    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        if !matches!(field.data_type(), DataType::Int64 | DataType::Float64) {
            continue;
        }
        if let Some((count, mean, min, max)) = describe(column) {
            println!(
                "{:<24} {:>8} {:>18.2} {:>18} {:>18}",
                field.name(),
                count,
                mean,
                min.to_string(),
                max.to_string()
            );
        }
    }
    println!();
}

fn run(config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path))?,
        None => PipelineConfig::default(),
    };

    let table = load_movies(&config.input_path)
        .with_context(|| format!("loading {}", config.input_path.display()))?;
    print_info(&table);

    let mismatches = find_year_mismatches(&table)?;
    println!(
        "release_date has a mismatched year (e.g. 2067 instead of 1967) in {} rows:",
        mismatches.len()
    );
    println!("{:>8} {:>14} {:>12} {:>14}", "row", "raw", "parsed", "release_year");
    for m in mismatches.iter().take(SAMPLE_ROWS) {
        println!(
            "{:>8} {:>14} {:>12} {:>14}",
            m.row,
            m.raw,
            m.parsed.to_string(),
            m.release_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "null".into())
        );
    }
    Ok(())
}
