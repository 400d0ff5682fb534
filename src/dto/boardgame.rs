//! Response payloads for the board-game catalog routes.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::BoardGameEntity;

/// Catalog entry as served to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardGameView {
    /// Stable identifier for the board game.
    pub id: Uuid,
    /// Display name.
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

impl From<BoardGameEntity> for BoardGameView {
    fn from(game: BoardGameEntity) -> Self {
        Self {
            id: game.id,
            name: game.name,
            module_name: game.module_name,
            package_name: game.package_name,
            activity_name: game.activity_name,
            min_playing_time: game.min_playing_time,
            max_playing_time: game.max_playing_time,
            min_number_of_players: game.min_number_of_players,
            max_number_of_players: game.max_number_of_players,
            publishers: game.publishers,
            artists: game.artists,
            designers: game.designers,
        }
    }
}
