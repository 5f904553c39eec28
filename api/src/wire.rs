/// Wire-level decoding helpers and HTTP body shapes.
///
/// Stored documents come from several form revisions, so decoding never trusts
/// a nested field: anything missing, null or of the wrong type becomes the
/// field's empty default instead of failing the whole record.
use crate::{MatchupPick, PlayInSelections, PredictionRecord, ResultRecord, Round, RoundPicks, Rounds, UserInfo};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a round map entry by entry so one bad matchup doesn't drop its siblings.
pub fn lenient_picks<'de, D>(deserializer: D) -> Result<RoundPicks, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(RoundPicks::new());
    };
    Ok(entries
        .into_iter()
        .map(|(key, pick)| (key, serde_json::from_value::<MatchupPick>(pick).unwrap_or_default()))
        .collect())
}

/// Pull round fields that older documents kept beside `user` instead of under `rounds`.
fn take_top_level_rounds(fields: &mut Map<String, Value>) -> Option<Rounds> {
    let mut found = Map::new();
    for round in Round::ALL {
        if let Some(value) = fields.remove(round.field_name()) {
            found.insert(round.field_name().to_string(), value);
        }
    }
    if found.is_empty() {
        return None;
    }
    Some(serde_json::from_value(Value::Object(found)).unwrap_or_default())
}

/// Keys owned by the `Stored` envelope. A record carrying its own copy would
/// serialize them twice and make the stored line unreadable.
const ENVELOPE_KEYS: [&str; 2] = ["id", "createdAt"];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrediction {
    #[serde(default, alias = "userData", deserialize_with = "lenient")]
    user: UserInfo,
    #[serde(default, deserialize_with = "lenient")]
    play_in_selections: PlayInSelections,
    #[serde(default, alias = "predictions", deserialize_with = "lenient")]
    rounds: Option<Rounds>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawPrediction> for PredictionRecord {
    fn from(raw: RawPrediction) -> Self {
        let RawPrediction { user, play_in_selections, rounds, mut rest } = raw;
        for key in ENVELOPE_KEYS {
            if let Some(dropped) = rest.remove(key) {
                debug!("ignoring client-supplied {key} {dropped}");
            }
        }
        let rounds = rounds
            .or_else(|| take_top_level_rounds(&mut rest))
            .unwrap_or_default();
        PredictionRecord { user, play_in_selections, rounds, extra: rest }
    }
}

#[derive(Deserialize)]
pub struct RawResult {
    #[serde(default, alias = "predictions", deserialize_with = "lenient")]
    rounds: Option<Rounds>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawResult> for ResultRecord {
    fn from(raw: RawResult) -> Self {
        let RawResult { rounds, mut rest } = raw;
        let rounds = rounds
            .or_else(|| take_top_level_rounds(&mut rest))
            .unwrap_or_default();
        ResultRecord { rounds }
    }
}

// ---------------------------------------------------------------------------
// HTTP bodies
// ---------------------------------------------------------------------------

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {details}", self.error),
            None => f.write_str(&self.error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedId {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_picks_ignores_non_object() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(deserialize_with = "lenient_picks")]
            picks: RoundPicks,
        }
        let holder: Holder = serde_json::from_value(json!({ "picks": [1, 2, 3] })).unwrap();
        assert!(holder.picks.is_empty());
    }

    #[test]
    fn unrelated_top_level_fields_stay_in_extra() {
        let record: PredictionRecord = serde_json::from_value(json!({
            "user": { "name": "Cy" },
            "firstRound": { "east-3": { "winner": "Pacers" } },
            "submittedFrom": "web"
        }))
        .unwrap();
        assert_eq!(record.rounds.first_round["east-3"].winner, "Pacers");
        assert_eq!(record.extra.len(), 1);
        assert_eq!(record.extra["submittedFrom"], "web");
    }

    #[test]
    fn envelope_keys_never_reach_extra() {
        let record: PredictionRecord = serde_json::from_value(json!({
            "id": "client-side-id",
            "createdAt": "yesterday",
            "user": { "name": "Di" },
            "source": "kiosk"
        }))
        .unwrap();
        assert_eq!(record.extra.len(), 1);
        assert_eq!(record.extra["source"], "kiosk");

        let stored = crate::Stored::new(record);
        let line = serde_json::to_string(&stored).unwrap();
        let back: crate::Stored<PredictionRecord> = serde_json::from_str(&line).unwrap();
        assert_eq!(back.id, stored.id);
        assert_eq!(back.record, stored.record);
    }

    #[test]
    fn error_body_display_includes_details() {
        let body = ErrorBody::new("Failed to calculate scores").with_details("disk full");
        assert_eq!(body.to_string(), "Failed to calculate scores: disk full");
        let json = serde_json::to_value(ErrorBody::new("No results found")).unwrap();
        assert_eq!(json, json!({ "error": "No results found" }));
    }
}
