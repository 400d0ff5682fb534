//! Durable record store holding authoritative session metadata and the
//! board-game catalog.

pub mod memory;
#[cfg(feature = "mongo-record")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    BoardGameEntity, GameSessionEntity, NewGameSession, RosterSnapshot, RosterWrite, SessionPatch,
};
use crate::dao::storage::StorageResult;
use crate::ident::PlayerRef;

/// Abstraction over the durable document store.
///
/// Per-document read-your-writes is assumed; cross-document transactions are
/// not. All mutations are typed: lifecycle and outcome changes go through
/// [`SessionPatch`], roster growth through set-union semantics, and roster
/// shrinkage through a compare-and-swap replace.
pub trait RecordStore: Send + Sync {
    /// Persist a new session document and return the store-assigned id.
    fn create_session(&self, session: NewGameSession) -> BoxFuture<'static, StorageResult<Uuid>>;
    /// Fetch a session document by id.
    fn find_session(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>>;
    /// Apply a typed patch to a session document. Returns `false` when the
    /// document does not exist.
    fn apply_session_patch(
        &self,
        id: Uuid,
        patch: SessionPatch,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Add a player to both the `players` and `teams` sequences with set-union
    /// semantics (adding a present ref is a no-op). Returns `false` when the
    /// document does not exist.
    fn add_roster_member(
        &self,
        id: Uuid,
        player: PlayerRef,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Replace both roster sequences only if they still match `expected`.
    fn replace_roster_if(
        &self,
        id: Uuid,
        expected: RosterSnapshot,
        next: RosterSnapshot,
    ) -> BoxFuture<'static, StorageResult<RosterWrite>>;
    /// List the whole board-game catalog.
    fn list_board_games(&self) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>>;
    /// Find catalog entries whose name starts with `prefix`.
    fn find_board_games_by_name(
        &self,
        prefix: String,
    ) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>>;
    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish the backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
