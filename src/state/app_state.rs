use crate::app::MenuItem;
use chrono::Local;
use pool_api::client::ScoresOutcome;
use pool_api::scoring::ScoredPrediction;
use pool_api::standings::Standings;
use pool_api::Round;

// ---------------------------------------------------------------------------
// Standings state
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ScoresStatus {
    #[default]
    Loading,
    /// Brackets exist but the server has no results to score them against.
    NotPosted,
    Posted(Standings),
}

#[derive(Debug, Default)]
pub struct StandingsState {
    pub status: ScoresStatus,
    /// Indices into `Standings::scores`, highest total first, ties in submission order.
    pub ranked: Vec<usize>,
    /// Position within `ranked`.
    pub selected: usize,
    pub last_loaded_at: Option<String>,
}

impl StandingsState {
    /// Store a fresh scores response, keeping the selected user where possible.
    pub fn load(&mut self, outcome: ScoresOutcome) {
        let previous = self.selected_score().map(|s| s.user.clone());
        self.last_loaded_at = Some(Local::now().format("%H:%M").to_string());

        match outcome {
            ScoresOutcome::NotPosted => {
                self.status = ScoresStatus::NotPosted;
                self.ranked.clear();
                self.selected = 0;
            }
            ScoresOutcome::Posted(standings) => {
                let mut ranked: Vec<usize> = (0..standings.scores.len()).collect();
                ranked.sort_by(|a, b| standings.scores[*b].total_score.cmp(&standings.scores[*a].total_score));
                self.selected = previous
                    .and_then(|name| ranked.iter().position(|&i| standings.scores[i].user == name))
                    .unwrap_or(0);
                self.ranked = ranked;
                self.status = ScoresStatus::Posted(standings);
            }
        }
    }

    pub fn scores(&self) -> &[ScoredPrediction] {
        match &self.status {
            ScoresStatus::Posted(standings) => &standings.scores,
            _ => &[],
        }
    }

    /// Scored brackets in ranking order.
    pub fn ranked_scores(&self) -> impl Iterator<Item = &ScoredPrediction> {
        let scores = self.scores();
        self.ranked.iter().filter_map(move |&i| scores.get(i))
    }

    pub fn selected_score(&self) -> Option<&ScoredPrediction> {
        let index = *self.ranked.get(self.selected)?;
        self.scores().get(index)
    }

    pub fn select_down(&mut self) {
        if self.selected + 1 < self.ranked.len() {
            self.selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Competition ranking labels ("1, 2, 2, 4") for points already sorted high to low.
pub fn rank_positions(points: &[u32]) -> Vec<usize> {
    let mut positions = Vec::with_capacity(points.len());
    for (idx, p) in points.iter().enumerate() {
        let position = match idx {
            0 => 1,
            _ if points[idx - 1] == *p => positions[idx - 1],
            _ => idx + 1,
        };
        positions.push(position);
    }
    positions
}

// ---------------------------------------------------------------------------
// Breakdown state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BreakdownState {
    pub round: Round,
    pub scroll_offset: u16,
}

impl BreakdownState {
    pub fn navigate_round_next(&mut self) {
        if let Some(next) = self.round.next() {
            self.round = next;
            self.scroll_offset = 0;
        }
    }

    pub fn navigate_round_prev(&mut self) {
        if let Some(prev) = self.round.prev() {
            self.round = prev;
            self.scroll_offset = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub standings: StandingsState,
    pub breakdown: BreakdownState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_api::scoring::RoundDetails;
    use pool_api::standings::rank;

    fn scored(user: &str, total_score: u32) -> ScoredPrediction {
        ScoredPrediction { user: user.into(), total_score, details: RoundDetails::default() }
    }

    fn posted(scores: Vec<ScoredPrediction>) -> ScoresOutcome {
        let standings = rank(&scores);
        ScoresOutcome::Posted(Standings { scores, standings })
    }

    #[test]
    fn ranking_matches_server_order() {
        let mut state = StandingsState::default();
        state.load(posted(vec![scored("A", 5), scored("B", 9), scored("C", 5)]));
        let names: Vec<&str> = state.ranked_scores().map(|s| s.user.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn reload_keeps_selected_user() {
        let mut state = StandingsState::default();
        state.load(posted(vec![scored("A", 5), scored("B", 3)]));
        state.select_down();
        assert_eq!(state.selected_score().map(|s| s.user.as_str()), Some("B"));

        state.load(posted(vec![scored("A", 5), scored("B", 8)]));
        assert_eq!(state.selected, 0);
        assert_eq!(state.selected_score().map(|s| s.user.as_str()), Some("B"));
    }

    #[test]
    fn not_posted_clears_rows() {
        let mut state = StandingsState::default();
        state.load(posted(vec![scored("A", 5)]));
        state.load(ScoresOutcome::NotPosted);
        assert_eq!(state.status, ScoresStatus::NotPosted);
        assert!(state.selected_score().is_none());
        assert!(state.last_loaded_at.is_some());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = StandingsState::default();
        state.load(posted(vec![scored("A", 1), scored("B", 0)]));
        state.select_down();
        state.select_down();
        assert_eq!(state.selected, 1);
        state.select_up();
        state.select_up();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn tied_points_share_a_position() {
        assert_eq!(rank_positions(&[9, 5, 5, 2]), vec![1, 2, 2, 4]);
        assert_eq!(rank_positions(&[3, 3, 3]), vec![1, 1, 1]);
        assert!(rank_positions(&[]).is_empty());
    }

    #[test]
    fn breakdown_round_navigation_clamps() {
        let mut breakdown = BreakdownState::default();
        breakdown.navigate_round_prev();
        assert_eq!(breakdown.round, Round::FirstRound);
        for _ in 0..5 {
            breakdown.navigate_round_next();
        }
        assert_eq!(breakdown.round, Round::Finals);
    }
}
