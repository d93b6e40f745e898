use anyhow::{Context, Result};
use movie_analysis::{Pipeline, PipelineConfig};
use std::{env, process::exit};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configuration ────────────────────────────────────────────
    let config = match env::args().nth(1) {
        Some(path) => PipelineConfig::from_yaml_file(&path)
            .with_context(|| format!("loading config {}", path))?,
        None => PipelineConfig::default(),
    };
    info!(
        input = %config.input_path.display(),
        output = %config.output_dir.display(),
        "configured"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let report = Pipeline::new(config)
        .run()
        .context("loading the movie dataset")?;
    print!("{}", report);

    let failures = report.failures();
    if failures > 0 {
        warn!(failures, "some analyses failed");
        exit(2);
    }
    info!("all done");
    Ok(())
}
