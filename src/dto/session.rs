//! Request and response payloads for session routes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{GameSessionEntity, LiveSessionEntity, SessionStatus},
    dto::{
        format_system_time,
        validation::{validate_player_email, validate_player_id},
    },
    error::AppError,
    ident::PlayerRef,
};

/// Incoming roster member, the two halves of a roster ref.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerInput {
    /// Stable player identifier, also the live points key.
    pub player_id: String,
    /// Email address paired with the id in the roster ref.
    pub email: String,
}

impl Validate for PlayerInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_id(&self.player_id) {
            errors.add("player_id", e);
        }
        if let Err(e) = validate_player_email(&self.email) {
            errors.add("email", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl TryFrom<PlayerInput> for PlayerRef {
    type Error = AppError;

    fn try_from(input: PlayerInput) -> Result<Self, Self::Error> {
        PlayerRef::new(input.player_id, input.email)
            .map_err(|err| AppError::BadRequest(err.to_string()))
    }
}

/// Convert a batch of inputs, failing on the first malformed entry.
pub fn into_refs(inputs: Vec<PlayerInput>) -> Result<Vec<PlayerRef>, AppError> {
    inputs.into_iter().map(PlayerRef::try_from).collect()
}

/// Payload used to bootstrap a brand-new scoring session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSessionRequest {
    /// Identity of the session administrator.
    #[validate(length(min = 1))]
    pub admin_id: String,
    /// Catalog id of the board game being played.
    #[validate(length(min = 1))]
    pub board_game_id: String,
    /// Starting roster.
    #[validate(length(min = 1), nested)]
    pub players: Vec<PlayerInput>,
    /// Points every player starts with.
    pub starting_points: u32,
    /// Team assignment; defaults to mirroring the roster when omitted.
    #[serde(default)]
    #[validate(nested)]
    pub teams: Option<Vec<PlayerInput>>,
}

/// Identifier of a freshly created session.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSessionResponse {
    /// Store-assigned session id.
    pub id: Uuid,
}

/// Result of a lifecycle transition.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    /// Session the transition was applied to.
    pub id: Uuid,
    /// Status after the transition.
    pub status: SessionStatus,
}

/// Record-store half of a session, as served to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    /// Session identifier.
    pub id: Uuid,
    /// Identity of the session administrator.
    pub admin_id: String,
    /// Catalog id of the board game being played.
    pub board_game_id: String,
    /// Roster as encoded `playerId|email` refs.
    pub players: Vec<String>,
    /// Team assignment as encoded refs.
    pub teams: Vec<String>,
    /// Winners as encoded refs, empty until the outcome is recorded.
    pub winners: Vec<String>,
    /// Losers as encoded refs, empty until the outcome is recorded.
    pub losers: Vec<String>,
    /// Points every player started with.
    pub starting_points: u32,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// RFC 3339 start timestamp, refreshed by activation.
    pub start_time: Option<String>,
    /// RFC 3339 end timestamp, set when the session ends.
    pub end_time: Option<String>,
}

impl From<GameSessionEntity> for SessionView {
    fn from(session: GameSessionEntity) -> Self {
        Self {
            id: session.id,
            admin_id: session.admin_id,
            board_game_id: session.board_game_id,
            players: encode_refs(&session.players),
            teams: encode_refs(&session.teams),
            winners: encode_refs(&session.winners),
            losers: encode_refs(&session.losers),
            starting_points: session.starting_points,
            status: session.status,
            start_time: session.start_time.map(format_system_time),
            end_time: session.end_time.map(format_system_time),
        }
    }
}

/// Live-store half of a session: visibility flag plus the scoreboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveSessionView {
    /// Whether the live board is visible.
    pub active: bool,
    /// Per-player points, keyed by player id.
    #[schema(value_type = std::collections::BTreeMap<String, i64>)]
    pub points: IndexMap<String, i64>,
}

impl From<LiveSessionEntity> for LiveSessionView {
    fn from(live: LiveSessionEntity) -> Self {
        Self {
            active: live.active,
            points: live.points,
        }
    }
}

/// Both halves of a session in one payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct FullSessionView {
    /// Record-store half.
    pub session: SessionView,
    /// Live-store half.
    pub live: LiveSessionView,
}

/// Payload for joining a player to a running session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddPlayerRequest {
    /// Player to roster.
    #[validate(nested)]
    pub player: PlayerInput,
    /// Points the player starts with.
    pub initial_points: u32,
}

/// Payload for removing a player from a session roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RemovePlayerRequest {
    /// Player to unroster.
    #[validate(nested)]
    pub player: PlayerInput,
}

/// Payload recording the outcome of a decided game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OutcomeRequest {
    /// Winning players; must be rostered.
    #[validate(nested)]
    pub winners: Vec<PlayerInput>,
    /// Losing players; must be rostered and disjoint from the winners.
    #[validate(nested)]
    pub losers: Vec<PlayerInput>,
}

/// Payload for an atomic relative points change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IncrementPointsRequest {
    /// Player whose points change.
    pub player_id: String,
    /// Signed delta to add.
    pub delta: i64,
}

impl Validate for IncrementPointsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_id(&self.player_id) {
            errors.add("player_id", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload for an absolute points overwrite.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPointsRequest {
    /// Player whose points change.
    pub player_id: String,
    /// New absolute points value.
    pub points: u32,
}

impl Validate for SetPointsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_id(&self.player_id) {
            errors.add("player_id", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn encode_refs(refs: &[PlayerRef]) -> Vec<String> {
    refs.iter().map(PlayerRef::encode).collect()
}
