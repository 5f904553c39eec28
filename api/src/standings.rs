use crate::scoring::{ScoredPrediction, score_prediction};
use crate::{PredictionRecord, ResultRecord, Stored};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub name: String,
    pub points: u32,
}

/// Every scored bracket plus the ranked table derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub scores: Vec<ScoredPrediction>,
    pub standings: Vec<StandingsRow>,
}

impl Standings {
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsError {
    /// Brackets exist but no results have been posted yet.
    NoResultsAvailable,
}

impl fmt::Display for StandingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandingsError::NoResultsAvailable => write!(f, "No results found"),
        }
    }
}

impl std::error::Error for StandingsError {}

/// The authoritative result: latest `created_at`, later insert on a tie.
pub fn select_current_result<T>(results: &[Stored<T>]) -> Option<&Stored<T>> {
    results.iter().max_by_key(|stored| stored.created_at)
}

/// Rank scored brackets by points, highest first. Equal scores keep submission order.
pub fn rank(scores: &[ScoredPrediction]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = scores
        .iter()
        .map(|s| StandingsRow { name: s.user.clone(), points: s.total_score })
        .collect();
    rows.sort_by(|a, b| b.points.cmp(&a.points));
    rows
}

/// Score every stored bracket against the current result and rank them.
///
/// No brackets yields an empty table even before results exist; brackets
/// without a result are reported as [`StandingsError::NoResultsAvailable`]
/// rather than scored against nothing.
pub fn compute_standings(
    predictions: &[PredictionRecord],
    current_result: Option<&ResultRecord>,
) -> Result<Standings, StandingsError> {
    if predictions.is_empty() {
        info!("no predictions submitted yet");
        return Ok(Standings::default());
    }
    let result = current_result.ok_or(StandingsError::NoResultsAvailable)?;

    let scores: Vec<ScoredPrediction> = predictions
        .iter()
        .map(|prediction| score_prediction(prediction, result))
        .collect();
    let standings = rank(&scores);
    info!("scored {} predictions", scores.len());

    Ok(Standings { scores, standings })
}
