use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Canonical series length: total games played, 4 through 7.
///
/// Picks arrive either as a bare game count (`5`, `"5"`) or as a series score
/// (`"4-1"`, `"1-4"`). Both normalize to the same value so they compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesLength(u8);

impl SeriesLength {
    pub const WINS_NEEDED: u8 = 4;
    pub const MAX_GAMES: u8 = 2 * Self::WINS_NEEDED - 1;

    pub const fn new(games: u8) -> Option<Self> {
        if games >= Self::WINS_NEEDED && games <= Self::MAX_GAMES {
            Some(Self(games))
        } else {
            None
        }
    }

    pub fn games(self) -> u8 {
        self.0
    }

    /// Games the losing side won.
    pub fn loser_wins(self) -> u8 {
        self.0 - Self::WINS_NEEDED
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some((left, right)) = raw.split_once('-') {
            let left: u8 = left.trim().parse().ok()?;
            let right: u8 = right.trim().parse().ok()?;
            let (wins, losses) = (left.max(right), left.min(right));
            if wins != Self::WINS_NEEDED {
                return None;
            }
            return Self::new(wins + losses);
        }
        Self::new(raw.parse().ok()?)
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|g| u8::try_from(g).ok()).and_then(Self::new),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }
}

impl fmt::Display for SeriesLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::WINS_NEEDED, self.loser_wins())
    }
}

impl FromStr for SeriesLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not a series length: {s:?}"))
    }
}

impl Serialize for SeriesLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for SeriesLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| D::Error::custom(format!("not a series length: {value}")))
    }
}
