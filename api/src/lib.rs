pub mod client;
pub mod scoring;
pub mod series;
pub mod standings;
pub mod wire;

pub use series::SeriesLength;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Bracket shape: fixed key space per round
// ---------------------------------------------------------------------------

pub const FIRST_ROUND_KEYS: [&str; 8] = [
    "east-0", "east-1", "east-2", "east-3", "west-0", "west-1", "west-2", "west-3",
];
pub const SEMIFINAL_KEYS: [&str; 4] = ["east-semi-0", "east-semi-1", "west-semi-0", "west-semi-1"];
pub const CONFERENCE_FINAL_KEYS: [&str; 2] = ["east-final", "west-final"];
pub const FINALS_KEY: &str = "finals";

/// Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Round {
    #[default]
    FirstRound,
    Semifinals,
    ConferenceFinals,
    Finals,
}

/// Points awarded for each independently matched field of a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPoints {
    pub winner: u32,
    pub games: u32,
    pub mvp: u32,
}

impl Round {
    pub const ALL: [Round; 4] = [
        Round::FirstRound,
        Round::Semifinals,
        Round::ConferenceFinals,
        Round::Finals,
    ];

    /// Rounds made of keyed series; the finals singleton is handled on its own.
    pub const SERIES: [Round; 3] = [Round::FirstRound, Round::Semifinals, Round::ConferenceFinals];

    pub fn label(&self) -> &'static str {
        match self {
            Round::FirstRound => "First Round",
            Round::Semifinals => "Conference Semifinals",
            Round::ConferenceFinals => "Conference Finals",
            Round::Finals => "Finals",
        }
    }

    /// The JSON field this round lives under inside `rounds`.
    pub fn field_name(&self) -> &'static str {
        match self {
            Round::FirstRound => "firstRound",
            Round::Semifinals => "semifinals",
            Round::ConferenceFinals => "conferenceFinals",
            Round::Finals => "finals",
        }
    }

    pub fn points(&self) -> RoundPoints {
        match self {
            Round::FirstRound => RoundPoints { winner: 1, games: 1, mvp: 0 },
            Round::Semifinals => RoundPoints { winner: 2, games: 1, mvp: 0 },
            Round::ConferenceFinals => RoundPoints { winner: 3, games: 1, mvp: 0 },
            Round::Finals => RoundPoints { winner: 4, games: 1, mvp: 1 },
        }
    }

    pub fn matchup_keys(&self) -> &'static [&'static str] {
        match self {
            Round::FirstRound => &FIRST_ROUND_KEYS,
            Round::Semifinals => &SEMIFINAL_KEYS,
            Round::ConferenceFinals => &CONFERENCE_FINAL_KEYS,
            Round::Finals => &[FINALS_KEY],
        }
    }

    pub fn is_valid_key(&self, key: &str) -> bool {
        self.matchup_keys().contains(&key)
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            Round::FirstRound => None,
            Round::Semifinals => Some(Round::FirstRound),
            Round::ConferenceFinals => Some(Round::Semifinals),
            Round::Finals => Some(Round::ConferenceFinals),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Round::FirstRound => Some(Round::Semifinals),
            Round::Semifinals => Some(Round::ConferenceFinals),
            Round::ConferenceFinals => Some(Round::Finals),
            Round::Finals => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupPick {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub winner: String,
    #[serde(default, deserialize_with = "wire::lenient", skip_serializing_if = "Option::is_none")]
    pub games: Option<SeriesLength>,
    /// Form fields the scoring side never looks at, kept so stored picks round-trip.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MatchupPick {
    /// Stand-in for a missing matchup on either side of a comparison.
    pub const EMPTY: MatchupPick = MatchupPick { winner: String::new(), games: None, extra: BTreeMap::new() };

    pub fn new(winner: impl Into<String>, games: Option<SeriesLength>) -> Self {
        Self { winner: winner.into(), games, extra: BTreeMap::new() }
    }
}

/// Final score guess kept for operators breaking ties by hand. Never scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakScore {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub team1: u32,
    #[serde(default, deserialize_with = "wire::lenient")]
    pub team2: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalsPick {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub winner: String,
    #[serde(default, deserialize_with = "wire::lenient", skip_serializing_if = "Option::is_none")]
    pub games: Option<SeriesLength>,
    #[serde(default, deserialize_with = "wire::lenient", skip_serializing_if = "String::is_empty")]
    pub mvp: String,
    #[serde(default, deserialize_with = "wire::lenient", skip_serializing_if = "Option::is_none")]
    pub tiebreak_score: Option<TiebreakScore>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FinalsPick {
    pub const EMPTY: FinalsPick = FinalsPick {
        winner: String::new(),
        games: None,
        mvp: String::new(),
        tiebreak_score: None,
        extra: BTreeMap::new(),
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalsRound {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub finals: FinalsPick,
}

pub type RoundPicks = BTreeMap<String, MatchupPick>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rounds {
    #[serde(default, deserialize_with = "wire::lenient_picks")]
    pub first_round: RoundPicks,
    #[serde(default, deserialize_with = "wire::lenient_picks")]
    pub semifinals: RoundPicks,
    #[serde(default, deserialize_with = "wire::lenient_picks")]
    pub conference_finals: RoundPicks,
    #[serde(default, deserialize_with = "wire::lenient")]
    pub finals: FinalsRound,
}

impl Rounds {
    /// Keyed picks for a series round. `None` for the finals singleton.
    pub fn picks(&self, round: Round) -> Option<&RoundPicks> {
        match round {
            Round::FirstRound => Some(&self.first_round),
            Round::Semifinals => Some(&self.semifinals),
            Round::ConferenceFinals => Some(&self.conference_finals),
            Round::Finals => None,
        }
    }

    pub fn picks_mut(&mut self, round: Round) -> Option<&mut RoundPicks> {
        match round {
            Round::FirstRound => Some(&mut self.first_round),
            Round::Semifinals => Some(&mut self.semifinals),
            Round::ConferenceFinals => Some(&mut self.conference_finals),
            Round::Finals => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        Round::SERIES
            .iter()
            .filter_map(|r| self.picks(*r))
            .all(BTreeMap::is_empty)
            && self.finals.finals == FinalsPick::EMPTY
    }

    /// Matchup keys that fall outside the fixed bracket key space, as `round/key`.
    pub fn unknown_keys(&self) -> Vec<String> {
        Round::SERIES
            .iter()
            .flat_map(|round| {
                self.picks(*round)
                    .into_iter()
                    .flat_map(|picks| picks.keys())
                    .filter(|key| !round.is_valid_key(key))
                    .map(|key| format!("{}/{key}", round.field_name()))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "wire::lenient")]
    pub phone: String,
    /// Registration fields the scoring side never looks at.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { "Unknown" } else { name }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInPair {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub seven: String,
    #[serde(default, deserialize_with = "wire::lenient")]
    pub eight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInSelections {
    #[serde(default, deserialize_with = "wire::lenient")]
    pub east: PlayInPair,
    #[serde(default, deserialize_with = "wire::lenient")]
    pub west: PlayInPair,
}

/// One registrant's submitted bracket. Immutable once stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "wire::RawPrediction")]
pub struct PredictionRecord {
    pub user: UserInfo,
    pub play_in_selections: PlayInSelections,
    pub rounds: Rounds,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authoritative outcomes entered after the games finish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "wire::RawResult")]
pub struct ResultRecord {
    pub rounds: Rounds,
}

/// A persisted document: the record plus its id and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Stored<T> {
    pub fn new(record: T) -> Self {
        Self::at(record, Utc::now())
    }

    pub fn at(record: T, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            record,
        }
    }
}
