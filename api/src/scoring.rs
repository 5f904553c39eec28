use crate::{FinalsPick, MatchupPick, PredictionRecord, ResultRecord, Round, RoundPoints, SeriesLength, FINALS_KEY};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Winner and series length, the two fields every pick is scored on.
pub trait SeriesPick {
    fn winner(&self) -> &str;
    fn games(&self) -> Option<SeriesLength>;
}

impl SeriesPick for MatchupPick {
    fn winner(&self) -> &str {
        &self.winner
    }

    fn games(&self) -> Option<SeriesLength> {
        self.games
    }
}

impl SeriesPick for FinalsPick {
    fn winner(&self) -> &str {
        &self.winner
    }

    fn games(&self) -> Option<SeriesLength> {
        self.games
    }
}

/// How one predicted series compared against its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdownEntry<P> {
    pub key: String,
    pub prediction: P,
    pub result: P,
    pub winner_match: bool,
    pub games_match: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp_match: Option<bool>,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDetails {
    pub first_round: Vec<ScoreBreakdownEntry<MatchupPick>>,
    pub semifinals: Vec<ScoreBreakdownEntry<MatchupPick>>,
    pub conference_finals: Vec<ScoreBreakdownEntry<MatchupPick>>,
    pub finals: Vec<ScoreBreakdownEntry<FinalsPick>>,
}

impl RoundDetails {
    /// Entries for a series round; empty for the finals.
    pub fn series(&self, round: Round) -> &[ScoreBreakdownEntry<MatchupPick>] {
        match round {
            Round::FirstRound => &self.first_round,
            Round::Semifinals => &self.semifinals,
            Round::ConferenceFinals => &self.conference_finals,
            Round::Finals => &[],
        }
    }

    fn series_mut(&mut self, round: Round) -> Option<&mut Vec<ScoreBreakdownEntry<MatchupPick>>> {
        match round {
            Round::FirstRound => Some(&mut self.first_round),
            Round::Semifinals => Some(&mut self.semifinals),
            Round::ConferenceFinals => Some(&mut self.conference_finals),
            Round::Finals => None,
        }
    }

    pub fn round_points(&self, round: Round) -> u32 {
        match round {
            Round::Finals => self.finals.iter().map(|e| e.points).sum(),
            _ => self.series(round).iter().map(|e| e.points).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPrediction {
    pub user: String,
    pub total_score: u32,
    pub details: RoundDetails,
}

fn compare<P: SeriesPick>(prediction: &P, result: &P) -> (bool, bool) {
    let winner_match = !prediction.winner().is_empty() && prediction.winner() == result.winner();
    let games_match = prediction.games().is_some() && prediction.games() == result.games();
    (winner_match, games_match)
}

fn award(matched: bool, points: u32) -> u32 {
    if matched { points } else { 0 }
}

/// Score one series pick against its result using the round's point table.
pub fn score_matchup(
    key: &str,
    prediction: &MatchupPick,
    result: &MatchupPick,
    points: RoundPoints,
) -> ScoreBreakdownEntry<MatchupPick> {
    let (winner_match, games_match) = compare(prediction, result);
    let earned = award(winner_match, points.winner) + award(games_match, points.games);
    trace!("{key}: winner {winner_match}, games {games_match} -> {earned}");

    ScoreBreakdownEntry {
        key: key.to_string(),
        prediction: prediction.clone(),
        result: result.clone(),
        winner_match,
        games_match,
        mvp_match: None,
        points: earned,
    }
}

/// Score the finals pick. The MVP is an extra independent field; the
/// tiebreak score is carried through for display and never earns points.
pub fn score_finals(prediction: &FinalsPick, result: &FinalsPick) -> ScoreBreakdownEntry<FinalsPick> {
    let points = Round::Finals.points();
    let (winner_match, games_match) = compare(prediction, result);
    let mvp_match = !prediction.mvp.is_empty() && prediction.mvp == result.mvp;
    let earned = award(winner_match, points.winner)
        + award(games_match, points.games)
        + award(mvp_match, points.mvp);
    trace!("{FINALS_KEY}: winner {winner_match}, games {games_match}, mvp {mvp_match} -> {earned}");

    ScoreBreakdownEntry {
        key: FINALS_KEY.to_string(),
        prediction: prediction.clone(),
        result: result.clone(),
        winner_match,
        games_match,
        mvp_match: Some(mvp_match),
        points: earned,
    }
}

static EMPTY_PICK: MatchupPick = MatchupPick::EMPTY;

/// Score a full bracket. Only matchups present in the prediction are visited;
/// a matchup missing from the result compares against an empty pick.
pub fn score_prediction(prediction: &PredictionRecord, result: &ResultRecord) -> ScoredPrediction {
    let user = prediction.user.display_name().to_string();
    let mut details = RoundDetails::default();
    let mut total_score = 0;

    for round in Round::SERIES {
        let (Some(predicted), Some(entries)) = (prediction.rounds.picks(round), details.series_mut(round)) else {
            continue;
        };
        let actual = result.rounds.picks(round);
        for (key, pick) in predicted {
            let outcome = actual.and_then(|a| a.get(key)).unwrap_or(&EMPTY_PICK);
            debug!("{user} {} {key}: predicted {pick:?}, result {outcome:?}", round.label());
            let entry = score_matchup(key, pick, outcome, round.points());
            total_score += entry.points;
            entries.push(entry);
        }
    }

    let finals = score_finals(&prediction.rounds.finals.finals, &result.rounds.finals.finals);
    debug!("{user} finals: {} points", finals.points);
    total_score += finals.points;
    details.finals.push(finals);

    ScoredPrediction { user, total_score, details }
}
