// src/pipeline.rs
//! Load → reconcile → seven isolated analyses → report.

use reqwest::blocking::Client;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

use crate::analysis::{
    self, DerivedTable, GenreCounts, HighRated, MovieProfit, PeopleSummary, ProfitRanking,
    RevenueExtremes,
};
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result};
use crate::fetch;
use crate::reconcile::{reconcile_release_dates, ReconcileStats};
use crate::sink;
use crate::table::{load_movies, Amount, MovieTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    ReleaseDates,
    HighRated,
    RevenueExtremes,
    TotalRevenue,
    Profit,
    People,
    Genres,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::ReleaseDates,
        AnalysisKind::HighRated,
        AnalysisKind::RevenueExtremes,
        AnalysisKind::TotalRevenue,
        AnalysisKind::Profit,
        AnalysisKind::People,
        AnalysisKind::Genres,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::ReleaseDates => "release-date ordering",
            AnalysisKind::HighRated => "high-rated filter",
            AnalysisKind::RevenueExtremes => "revenue extremes",
            AnalysisKind::TotalRevenue => "total revenue",
            AnalysisKind::Profit => "profitability ranking",
            AnalysisKind::People => "personnel frequency",
            AnalysisKind::Genres => "genre frequency",
        }
    }
}

/// What a successful analysis produced.
#[derive(Debug)]
pub enum AnalysisOutput {
    SortedByDate { path: PathBuf, rows: usize },
    HighRated { path: PathBuf, count: usize },
    RevenueExtremes(RevenueExtremes),
    TotalRevenue(Amount),
    Profit { path: PathBuf, leaders: Vec<MovieProfit> },
    People(PeopleSummary),
    Genres { path: PathBuf, top: Vec<(String, usize)> },
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub kind: AnalysisKind,
    pub result: Result<AnalysisOutput>,
}

#[derive(Debug)]
pub struct RunReport {
    pub rows: usize,
    pub columns: usize,
    pub reconcile: ReconcileStats,
    pub outcomes: Vec<AnalysisOutcome>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn outcome(&self, kind: AnalysisKind) -> Option<&AnalysisOutcome> {
        self.outcomes.iter().find(|o| o.kind == kind)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn money(amount: &Option<Amount>) -> String {
    match amount {
        Some(a) => format!("${}", a),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for AnalysisOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisOutput::SortedByDate { path, .. } => {
                writeln!(f, "Sorted by release date saved to '{}'", file_name(path))
            }
            AnalysisOutput::HighRated { path, count } => writeln!(
                f,
                "{} high-rated movies saved to '{}'",
                count,
                file_name(path)
            ),
            AnalysisOutput::RevenueExtremes(ex) => {
                writeln!(f, "Revenue extremes:")?;
                for (label, movie) in [("Highest", &ex.highest), ("Lowest", &ex.lowest)] {
                    writeln!(
                        f,
                        "{}: {} ({})",
                        label,
                        movie.title.as_deref().unwrap_or("<untitled>"),
                        money(&movie.revenue)
                    )?;
                }
                Ok(())
            }
            AnalysisOutput::TotalRevenue(total) => writeln!(f, "Total revenue: ${}", total),
            AnalysisOutput::Profit { path, leaders } => {
                writeln!(f, "Top 10 by profit saved to '{}'", file_name(path))?;
                for leader in leaders {
                    writeln!(
                        f,
                        "{}: {}",
                        leader.title.as_deref().unwrap_or("<untitled>"),
                        money(&leader.profit)
                    )?;
                }
                Ok(())
            }
            AnalysisOutput::People(p) => {
                writeln!(
                    f,
                    "Top director: {} ({} movies)",
                    p.top_director.name, p.top_director.count
                )?;
                writeln!(
                    f,
                    "Top actor: {} ({} movies)",
                    p.top_actor.name, p.top_actor.count
                )
            }
            AnalysisOutput::Genres { path, top } => {
                writeln!(f, "Genre counts saved to '{}'", file_name(path))?;
                for (genre, count) in top {
                    writeln!(f, "   - {}: {} movies", genre, count)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dataset loaded: {} movies, {} columns",
            self.rows, self.columns
        )?;
        writeln!(f)?;
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(output) => write!(f, "{}", output)?,
                Err(e) => writeln!(f, "{} failed: {}", outcome.kind.label(), e)?,
            }
        }
        writeln!(f)?;
        match self.failures() {
            0 => writeln!(f, "All analyses complete!"),
            n => writeln!(f, "All analyses complete! ({} of {} failed)", n, self.outcomes.len()),
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Downloads the source when configured, then loads and validates it.
    /// Any error here is fatal to the run.
    pub fn load(&self) -> Result<MovieTable> {
        let cfg = &self.config;
        fs::create_dir_all(&cfg.output_dir).map_err(|e| AnalysisError::io(&cfg.output_dir, e))?;

        match (&cfg.source_url, cfg.download) {
            (Some(url), true) => {
                let client = Client::new();
                fetch::download_dataset(&client, url, &cfg.input_path)?;
            }
            (None, true) => warn!("download requested but no source_url configured"),
            _ => {}
        }

        load_movies(&cfg.input_path)
    }

    /// Runs every stage. Only load/reconcile failures abort; analysis failures
    /// are recorded in the report.
    pub fn run(&self) -> Result<RunReport> {
        let mut table = self.load()?;
        let (rows, columns) = (table.num_rows(), table.num_columns());

        let reconcile = reconcile_release_dates(&mut table)?;
        let outcomes = self.analyze(&table);

        let report = RunReport {
            rows,
            columns,
            reconcile,
            outcomes,
        };
        info!(failures = report.failures(), "all analyses complete");
        Ok(report)
    }

    /// Runs the seven analyses in order, isolating each one's failure.
    pub fn analyze(&self, table: &MovieTable) -> Vec<AnalysisOutcome> {
        AnalysisKind::ALL
            .iter()
            .map(|&kind| {
                let result = self.run_one(kind, table);
                if let Err(e) = &result {
                    error!(analysis = kind.label(), "{}", e);
                }
                AnalysisOutcome { kind, result }
            })
            .collect()
    }

    fn persist(&self, derived: &DerivedTable) -> Result<PathBuf> {
        sink::write_table(derived, &self.config.output_dir, self.config.format)
    }

    fn run_one(&self, kind: AnalysisKind, table: &MovieTable) -> Result<AnalysisOutput> {
        let names = &self.config.artifacts;
        match kind {
            AnalysisKind::ReleaseDates => {
                let sorted = analysis::sort_by_release_date(table, &names.movies_by_date)?;
                let path = self.persist(&sorted)?;
                Ok(AnalysisOutput::SortedByDate {
                    path,
                    rows: sorted.num_rows(),
                })
            }
            AnalysisKind::HighRated => {
                let HighRated { table: derived, count } =
                    analysis::high_rated(table, &names.high_rated)?;
                let path = self.persist(&derived)?;
                Ok(AnalysisOutput::HighRated { path, count })
            }
            AnalysisKind::RevenueExtremes => Ok(AnalysisOutput::RevenueExtremes(
                analysis::revenue_extremes(table)?,
            )),
            AnalysisKind::TotalRevenue => {
                Ok(AnalysisOutput::TotalRevenue(analysis::total_revenue(table)?))
            }
            AnalysisKind::Profit => {
                let ProfitRanking {
                    table: derived,
                    leaders,
                } = analysis::top_profits(table, &names.top_profit)?;
                let path = self.persist(&derived)?;
                Ok(AnalysisOutput::Profit { path, leaders })
            }
            AnalysisKind::People => Ok(AnalysisOutput::People(analysis::people_frequency(
                table,
            )?)),
            AnalysisKind::Genres => {
                let GenreCounts {
                    table: derived,
                    counts,
                } = analysis::genre_counts(table, &names.genre_counts)?;
                let path = self.persist(&derived)?;
                let top = counts
                    .into_iter()
                    .take(analysis::genres::GENRE_LEADERS)
                    .collect();
                Ok(AnalysisOutput::Genres { path, top })
            }
        }
    }
}
