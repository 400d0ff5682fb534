use mongodb::bson::{Binary, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    BoardGameEntity, GameSessionEntity, NewGameSession, SessionStatus, Timestamp,
};
use crate::ident::PlayerRef;

/// Session document as stored in the `game_sessions` collection. Timestamps
/// use the two-field `{seconds, nanos}` wire representation; roster refs are
/// the canonical encoded strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSessionDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    admin_id: String,
    board_game_id: String,
    players: Vec<PlayerRef>,
    teams: Vec<PlayerRef>,
    #[serde(default)]
    winners: Vec<PlayerRef>,
    #[serde(default)]
    losers: Vec<PlayerRef>,
    starting_points: u32,
    status: SessionStatus,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
}

impl MongoSessionDocument {
    /// Build the document for a brand-new session under the given id.
    pub fn new(id: Uuid, session: NewGameSession) -> Self {
        Self {
            id,
            admin_id: session.admin_id,
            board_game_id: session.board_game_id,
            players: session.players,
            teams: session.teams,
            winners: Vec::new(),
            losers: Vec::new(),
            starting_points: session.starting_points,
            status: SessionStatus::Created,
            start_time: Some(Timestamp::from(session.start_time)),
            end_time: None,
        }
    }
}

impl From<MongoSessionDocument> for GameSessionEntity {
    fn from(value: MongoSessionDocument) -> Self {
        Self {
            id: value.id,
            admin_id: value.admin_id,
            board_game_id: value.board_game_id,
            players: value.players,
            teams: value.teams,
            winners: value.winners,
            losers: value.losers,
            starting_points: value.starting_points,
            status: value.status,
            start_time: value.start_time.map(Into::into),
            end_time: value.end_time.map(Into::into),
        }
    }
}

/// Catalog document as stored in the `board_games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoBoardGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    module_name: String,
    package_name: String,
    activity_name: String,
    min_playing_time: u32,
    max_playing_time: u32,
    min_number_of_players: u32,
    max_number_of_players: u32,
    #[serde(default)]
    publishers: Vec<String>,
    #[serde(default)]
    artists: Vec<String>,
    #[serde(default)]
    designers: Vec<String>,
}

impl From<MongoBoardGameDocument> for BoardGameEntity {
    fn from(value: MongoBoardGameDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            module_name: value.module_name,
            package_name: value.package_name,
            activity_name: value.activity_name,
            min_playing_time: value.min_playing_time,
            max_playing_time: value.max_playing_time,
            min_number_of_players: value.min_number_of_players,
            max_number_of_players: value.max_number_of_players,
            publishers: value.publishers,
            artists: value.artists,
            designers: value.designers,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

/// Stored string for a status, shared with the serde representation.
pub fn status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Created => "CREATED",
        SessionStatus::Active => "ACTIVE",
        SessionStatus::Suspended => "SUSPENDED",
        SessionStatus::Ended => "ENDED",
    }
}

/// Encode a roster sequence into the stored string array.
pub fn encoded_roster(players: &[PlayerRef]) -> Vec<String> {
    players.iter().map(PlayerRef::encode).collect()
}
