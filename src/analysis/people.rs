use arrow::array::AsArray;
use tracing::info;

use super::value_counts;
use crate::error::{AnalysisError, Result};
use crate::table::{columns, MovieTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequency {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleSummary {
    pub top_director: Frequency,
    pub top_actor: Frequency,
    /// Non-null director cells counted.
    pub director_credits: usize,
    /// Cast entries after exploding.
    pub actor_credits: usize,
}

fn top(counts: &[(String, usize)], what: &str) -> Result<Frequency> {
    counts
        .first()
        .map(|(name, count)| Frequency {
            name: name.clone(),
            count: *count,
        })
        .ok_or_else(|| AnalysisError::data_shape(format!("no {} values to count", what)))
}

/// Most frequent director (raw cell value) and most frequent actor across the
/// exploded cast. Ties go to whoever was seen first.
pub fn people_frequency(table: &MovieTable) -> Result<PeopleSummary> {
    table.ensure_not_empty("personnel frequency")?;

    let directors = table.strings(columns::DIRECTOR)?;
    let director_counts = value_counts(directors.iter().flatten());

    let exploded = table.explode(columns::CAST)?;
    let cast = exploded
        .column_by_name(columns::CAST)
        .ok_or_else(|| AnalysisError::data_shape("cast lost by explode"))?
        .as_string::<i32>();
    let actor_counts = value_counts(cast.iter().flatten());

    let summary = PeopleSummary {
        top_director: top(&director_counts, "director")?,
        top_actor: top(&actor_counts, "cast")?,
        director_credits: director_counts.iter().map(|(_, c)| c).sum(),
        actor_credits: actor_counts.iter().map(|(_, c)| c).sum(),
    };
    info!(
        director = %summary.top_director.name,
        actor = %summary.top_actor.name,
        "personnel frequency computed"
    );
    Ok(summary)
}
