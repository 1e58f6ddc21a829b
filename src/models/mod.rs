use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod object_id;
mod validation;

pub use object_id::{is_valid_object_id, ObjectId, OBJECT_ID_LEN};
pub use validation::{FieldChecks, FieldError, Validate, ValidationError};

/// A stored document: a JSON object as held by the document store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Key under which the store keeps a document's identifier.
pub const INTERNAL_ID_FIELD: &str = "_id";
/// Key under which clients see a document's identifier.
pub const PUBLIC_ID_FIELD: &str = "id";

/// Store collection backing each entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Players,
    Matches,
    Statlines,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Players => "players",
            Collection::Matches => "matches",
            Collection::Statlines => "statlines",
        }
    }
}

/// Entity kinds that are persisted as documents.
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

/// A stored record as returned to clients, with its public `id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
}

/// Replaces the internal id key with the public `id` string.
pub fn with_public_id(mut doc: Document) -> Document {
    if let Some(raw) = doc.remove(INTERNAL_ID_FIELD) {
        let id = match raw {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        doc.insert(PUBLIC_ID_FIELD.to_string(), serde_json::Value::String(id));
    }
    doc
}

impl<T: Entity> Record<T> {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(with_public_id(doc)))
    }
}

/// Response body for every create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

// Players

#[derive(Debug, Deserialize)]
pub struct PlayerInput {
    pub name: String,
    pub number: i64,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub number: u8,
    pub position: Option<String>,
}

impl Entity for Player {
    const COLLECTION: Collection = Collection::Players;
}

impl Validate for PlayerInput {
    type Record = Player;

    fn validate(self) -> Result<Player, ValidationError> {
        let mut checks = FieldChecks::new();
        checks.non_empty("name", &self.name);
        let number = checks.in_range("number", self.number, 0, 99).unwrap_or_default();

        checks.finish(Player {
            name: self.name,
            number,
            position: self.position,
        })
    }
}

// Matches

fn default_home() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MatchInput {
    pub opponent: String,
    pub date: String,
    #[serde(default = "default_home")]
    pub home: bool,
    #[serde(default)]
    pub team_score: Option<i64>,
    #[serde(default)]
    pub opponent_score: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub opponent: String,
    /// Tip-off time, normalized to UTC.
    pub date: NaiveDateTime,
    pub home: bool,
    pub team_score: Option<u64>,
    pub opponent_score: Option<u64>,
    pub notes: Option<String>,
}

impl Entity for Match {
    const COLLECTION: Collection = Collection::Matches;
}

/// Parses a match date. Offsets are converted to UTC, naive values are
/// taken as UTC and a bare date means midnight.
pub fn parse_match_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = value.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl Validate for MatchInput {
    type Record = Match;

    fn validate(self) -> Result<Match, ValidationError> {
        let mut checks = FieldChecks::new();
        let date = parse_match_date(&self.date);
        if date.is_none() {
            checks.reject("date", "must be a valid date-time");
        }
        let team_score = checks.optional_counter("team_score", self.team_score);
        let opponent_score = checks.optional_counter("opponent_score", self.opponent_score);

        checks.finish(Match {
            opponent: self.opponent,
            date: date.unwrap_or_default(),
            home: self.home,
            team_score,
            opponent_score,
            notes: self.notes,
        })
    }
}

// Statlines

#[derive(Debug, Deserialize)]
pub struct StatlineInput {
    pub match_id: String,
    pub player_id: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub rebounds: i64,
    #[serde(default)]
    pub assists: i64,
    #[serde(default)]
    pub steals: i64,
    #[serde(default)]
    pub blocks: i64,
    #[serde(default)]
    pub turnovers: i64,
}

/// One player's box score line for one match.
///
/// `match_id` and `player_id` are only checked for shape; the referenced
/// match and player may not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statline {
    pub match_id: ObjectId,
    pub player_id: ObjectId,
    pub points: u64,
    pub rebounds: u64,
    pub assists: u64,
    pub steals: u64,
    pub blocks: u64,
    pub turnovers: u64,
}

impl Entity for Statline {
    const COLLECTION: Collection = Collection::Statlines;
}

impl Validate for StatlineInput {
    type Record = Statline;

    fn validate(self) -> Result<Statline, ValidationError> {
        let mut checks = FieldChecks::new();
        let points = checks.counter("points", self.points);
        let rebounds = checks.counter("rebounds", self.rebounds);
        let assists = checks.counter("assists", self.assists);
        let steals = checks.counter("steals", self.steals);
        let blocks = checks.counter("blocks", self.blocks);
        let turnovers = checks.counter("turnovers", self.turnovers);
        checks.finish(())?;

        let (Some(match_id), Some(player_id)) =
            (ObjectId::parse(&self.match_id), ObjectId::parse(&self.player_id))
        else {
            return Err(ValidationError::MalformedId("Invalid match_id or player_id"));
        };

        Ok(Statline {
            match_id,
            player_id,
            points,
            rebounds,
            assists,
            steals,
            blocks,
            turnovers,
        })
    }
}
