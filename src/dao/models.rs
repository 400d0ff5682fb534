use std::time::{Duration, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::ident::PlayerRef;

/// Lifecycle status of a scoring session, authoritative in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Session document exists; scoring has not started.
    Created,
    /// Scoring is in progress.
    Active,
    /// Scoring is paused at the application layer; the live board stays visible.
    Suspended,
    /// Terminal state; no outgoing transitions.
    Ended,
}

/// Catalog entry describing a board game, seeded out of band and read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardGameEntity {
    /// Stable identifier for the board game.
    pub id: Uuid,
    /// Display name used for prefix search.
    pub name: String,
    /// Companion module implementing this game.
    pub module_name: String,
    /// Android package shipping the module.
    pub package_name: String,
    /// Entry activity inside the package.
    pub activity_name: String,
    /// Shortest expected playing time in minutes.
    pub min_playing_time: u32,
    /// Longest expected playing time in minutes.
    pub max_playing_time: u32,
    /// Minimum supported player count.
    pub min_number_of_players: u32,
    /// Maximum supported player count.
    pub max_number_of_players: u32,
    /// Publishing companies credited for the game.
    pub publishers: Vec<String>,
    /// Artists credited for the game.
    pub artists: Vec<String>,
    /// Designers credited for the game.
    pub designers: Vec<String>,
}

/// Session metadata persisted in the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSessionEntity {
    /// Identifier assigned by the record store on creation.
    pub id: Uuid,
    /// Identity of the session administrator.
    pub admin_id: String,
    /// Board game being played.
    pub board_game_id: String,
    /// Roster of participating players.
    pub players: Vec<PlayerRef>,
    /// Team assignment mirror of the roster.
    pub teams: Vec<PlayerRef>,
    /// Players recorded as winners once the outcome is known.
    pub winners: Vec<PlayerRef>,
    /// Players recorded as losers once the outcome is known.
    pub losers: Vec<PlayerRef>,
    /// Points every player starts with.
    pub starting_points: u32,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Server-assigned start timestamp, refreshed by activation.
    pub start_time: Option<SystemTime>,
    /// Server-assigned end timestamp, set when the session ends.
    pub end_time: Option<SystemTime>,
}

/// Payload for creating a session; the record store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameSession {
    /// Identity of the session administrator.
    pub admin_id: String,
    /// Board game being played.
    pub board_game_id: String,
    /// Starting roster.
    pub players: Vec<PlayerRef>,
    /// Starting team assignment.
    pub teams: Vec<PlayerRef>,
    /// Points every player starts with.
    pub starting_points: u32,
    /// Server-assigned creation timestamp.
    pub start_time: SystemTime,
}

impl NewGameSession {
    /// Materialize the full entity once the store has assigned an id.
    pub fn into_entity(self, id: Uuid) -> GameSessionEntity {
        GameSessionEntity {
            id,
            admin_id: self.admin_id,
            board_game_id: self.board_game_id,
            players: self.players,
            teams: self.teams,
            winners: Vec::new(),
            losers: Vec::new(),
            starting_points: self.starting_points,
            status: SessionStatus::Created,
            start_time: Some(self.start_time),
            end_time: None,
        }
    }
}

/// Closed set of typed partial updates applied to a session document.
///
/// One variant per coordinator operation; there is no free-form patch, so
/// illegal status strings cannot reach the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPatch {
    /// Mark the session active and refresh its start timestamp.
    Activate {
        /// New start timestamp.
        start_time: SystemTime,
    },
    /// Mark the session suspended; timestamps are untouched.
    Suspend,
    /// Mark the session ended and stamp its end time.
    End {
        /// Final end timestamp.
        end_time: SystemTime,
    },
    /// Record the session outcome; status and timestamps are untouched.
    Outcome {
        /// Winning players.
        winners: Vec<PlayerRef>,
        /// Losing players.
        losers: Vec<PlayerRef>,
    },
}

impl SessionPatch {
    /// Status the patch moves the session to, if it changes status at all.
    pub fn status(&self) -> Option<SessionStatus> {
        match self {
            SessionPatch::Activate { .. } => Some(SessionStatus::Active),
            SessionPatch::Suspend => Some(SessionStatus::Suspended),
            SessionPatch::End { .. } => Some(SessionStatus::Ended),
            SessionPatch::Outcome { .. } => None,
        }
    }

    /// Apply the patch to an in-memory entity.
    pub fn apply_to(&self, session: &mut GameSessionEntity) {
        if let Some(status) = self.status() {
            session.status = status;
        }
        match self {
            SessionPatch::Activate { start_time } => session.start_time = Some(*start_time),
            SessionPatch::Suspend => {}
            SessionPatch::End { end_time } => session.end_time = Some(*end_time),
            SessionPatch::Outcome { winners, losers } => {
                session.winners = winners.clone();
                session.losers = losers.clone();
            }
        }
    }
}

/// Roster state used for compare-and-swap roster replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSnapshot {
    /// Players sequence.
    pub players: Vec<PlayerRef>,
    /// Teams sequence.
    pub teams: Vec<PlayerRef>,
}

impl From<&GameSessionEntity> for RosterSnapshot {
    fn from(session: &GameSessionEntity) -> Self {
        Self {
            players: session.players.clone(),
            teams: session.teams.clone(),
        }
    }
}

/// Outcome of a guarded roster write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterWrite {
    /// The expected snapshot matched and the replacement was written.
    Applied,
    /// The stored roster no longer matches the expected snapshot.
    Conflict,
    /// No session document exists for the id.
    Missing,
}

/// Volatile mirror of a session held in the live store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveSessionEntity {
    /// Whether the live board is visible.
    pub active: bool,
    /// Per-player points, keyed by the player-id half of the roster refs.
    pub points: IndexMap<String, i64>,
}

impl LiveSessionEntity {
    /// Build the initial mirror for a roster, everyone at `starting_points`.
    pub fn initial(players: &[PlayerRef], starting_points: u32) -> Self {
        let points = players
            .iter()
            .map(|player| (player.player_id().to_owned(), i64::from(starting_points)))
            .collect();
        Self {
            active: true,
            points,
        }
    }
}

impl From<&LiveSessionEntity> for Value {
    fn from(entity: &LiveSessionEntity) -> Self {
        let points: serde_json::Map<String, Value> = entity
            .points
            .iter()
            .map(|(player_id, points)| (player_id.clone(), json!(points)))
            .collect();
        json!({
            "active": entity.active,
            "points": points,
        })
    }
}

/// Two-field timestamp representation exchanged with the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Whole seconds since the Unix epoch.
    pub seconds: i64,
    /// Sub-second nanoseconds.
    pub nanos: u32,
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        // Pre-epoch timestamps never occur in practice; clamp instead of failing.
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self {
            seconds: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos(),
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(timestamp: Timestamp) -> Self {
        UNIX_EPOCH
            + Duration::from_secs(timestamp.seconds.max(0) as u64)
            + Duration::from_nanos(u64::from(timestamp.nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> PlayerRef {
        PlayerRef::new(id, format!("{id}@example.com")).unwrap()
    }

    #[test]
    fn timestamp_round_trips_through_two_field_form() {
        let time = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let wire = Timestamp::from(time);
        assert_eq!(wire.seconds, 1_700_000_000);
        assert_eq!(wire.nanos, 123_456_789);
        assert_eq!(SystemTime::from(wire), time);
    }

    #[test]
    fn initial_live_session_scores_every_player() {
        let roster = vec![player("p1"), player("p2")];
        let live = LiveSessionEntity::initial(&roster, 10);
        assert!(live.active);
        assert_eq!(live.points.get("p1"), Some(&10));
        assert_eq!(live.points.get("p2"), Some(&10));
        assert_eq!(live.points.len(), 2);
    }

    #[test]
    fn live_session_value_shape() {
        let live = LiveSessionEntity::initial(&[player("p1")], 5);
        let value = Value::from(&live);
        assert_eq!(value["active"], json!(true));
        assert_eq!(value["points"]["p1"], json!(5));
    }

    #[test]
    fn status_serializes_as_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Created).unwrap(),
            "\"CREATED\""
        );
        assert_eq!(
            serde_json::from_str::<SessionStatus>("\"SUSPENDED\"").unwrap(),
            SessionStatus::Suspended
        );
    }

    #[test]
    fn outcome_patch_leaves_status_untouched() {
        let new = NewGameSession {
            admin_id: "admin".into(),
            board_game_id: "bg".into(),
            players: vec![player("p1")],
            teams: vec![player("p1")],
            starting_points: 10,
            start_time: SystemTime::now(),
        };
        let mut session = new.into_entity(Uuid::new_v4());
        session.status = SessionStatus::Active;

        SessionPatch::Outcome {
            winners: vec![player("p1")],
            losers: vec![],
        }
        .apply_to(&mut session);

        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.winners, vec![player("p1")]);
    }
}
