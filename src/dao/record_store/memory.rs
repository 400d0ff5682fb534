//! In-memory record store used by unit tests and local development.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    BoardGameEntity, GameSessionEntity, NewGameSession, RosterSnapshot, RosterWrite, SessionPatch,
};
use crate::dao::record_store::RecordStore;
use crate::dao::storage::StorageResult;
use crate::ident::PlayerRef;

/// Record store backed by process memory, implementing the same contract as
/// the MongoDB backend. Per-document mutations are atomic through the map's
/// per-entry locking.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    sessions: Arc<DashMap<Uuid, GameSessionEntity>>,
    board_games: Arc<RwLock<Vec<BoardGameEntity>>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the board-game catalog, as the production catalog is seeded out of band.
    pub fn with_board_games(self, catalog: Vec<BoardGameEntity>) -> Self {
        if let Ok(mut games) = self.board_games.write() {
            *games = catalog;
        }
        self
    }

    /// Ids of every stored session, for assertions.
    #[cfg(test)]
    pub(crate) fn session_ids(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    fn catalog(&self) -> Vec<BoardGameEntity> {
        self.board_games
            .read()
            .map(|games| games.clone())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn create_session(&self, session: NewGameSession) -> BoxFuture<'static, StorageResult<Uuid>> {
        let store = self.clone();
        Box::pin(async move {
            let id = Uuid::new_v4();
            store.sessions.insert(id, session.into_entity(id));
            Ok(id)
        })
    }

    fn find_session(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.sessions.get(&id).map(|entry| entry.clone())) })
    }

    fn apply_session_patch(
        &self,
        id: Uuid,
        patch: SessionPatch,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            match store.sessions.get_mut(&id) {
                Some(mut entry) => {
                    patch.apply_to(&mut entry);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn add_roster_member(
        &self,
        id: Uuid,
        player: PlayerRef,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            match store.sessions.get_mut(&id) {
                Some(mut entry) => {
                    if !entry.players.contains(&player) {
                        entry.players.push(player.clone());
                    }
                    if !entry.teams.contains(&player) {
                        entry.teams.push(player);
                    }
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn replace_roster_if(
        &self,
        id: Uuid,
        expected: RosterSnapshot,
        next: RosterSnapshot,
    ) -> BoxFuture<'static, StorageResult<RosterWrite>> {
        let store = self.clone();
        Box::pin(async move {
            match store.sessions.get_mut(&id) {
                Some(mut entry) => {
                    if entry.players != expected.players || entry.teams != expected.teams {
                        return Ok(RosterWrite::Conflict);
                    }
                    entry.players = next.players;
                    entry.teams = next.teams;
                    Ok(RosterWrite::Applied)
                }
                None => Ok(RosterWrite::Missing),
            }
        })
    }

    fn list_board_games(&self) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.catalog()) })
    }

    fn find_board_games_by_name(
        &self,
        prefix: String,
    ) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .catalog()
                .into_iter()
                .filter(|game| game.name.starts_with(&prefix))
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn player(id: &str) -> PlayerRef {
        PlayerRef::new(id, format!("{id}@example.com")).unwrap()
    }

    fn new_session(players: Vec<PlayerRef>) -> NewGameSession {
        NewGameSession {
            admin_id: "admin-1".into(),
            board_game_id: "bg-1".into(),
            teams: players.clone(),
            players,
            starting_points: 10,
            start_time: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let store = MemoryRecordStore::new();
        let a = store
            .create_session(new_session(vec![player("p1")]))
            .await
            .unwrap();
        let b = store
            .create_session(new_session(vec![player("p1")]))
            .await
            .unwrap();
        assert_ne!(a, b);
        assert!(store.find_session(a).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn add_roster_member_is_set_union() {
        let store = MemoryRecordStore::new();
        let id = store
            .create_session(new_session(vec![player("p1")]))
            .await
            .unwrap();

        assert!(store.add_roster_member(id, player("p1")).await.unwrap());
        let session = store.find_session(id).await.unwrap().unwrap();
        assert_eq!(session.players.len(), 1);

        assert!(store.add_roster_member(id, player("p2")).await.unwrap());
        let session = store.find_session(id).await.unwrap().unwrap();
        assert_eq!(session.players, vec![player("p1"), player("p2")]);
        assert_eq!(session.teams, vec![player("p1"), player("p2")]);
    }

    #[tokio::test]
    async fn replace_roster_detects_conflicts() {
        let store = MemoryRecordStore::new();
        let id = store
            .create_session(new_session(vec![player("p1"), player("p2")]))
            .await
            .unwrap();
        let session = store.find_session(id).await.unwrap().unwrap();
        let expected = RosterSnapshot::from(&session);

        let stale = RosterSnapshot {
            players: vec![player("p9")],
            teams: vec![player("p9")],
        };
        assert_eq!(
            store
                .replace_roster_if(id, stale, expected.clone())
                .await
                .unwrap(),
            RosterWrite::Conflict
        );

        let next = RosterSnapshot {
            players: vec![player("p2")],
            teams: vec![player("p2")],
        };
        assert_eq!(
            store
                .replace_roster_if(id, expected, next.clone())
                .await
                .unwrap(),
            RosterWrite::Applied
        );
        let session = store.find_session(id).await.unwrap().unwrap();
        assert_eq!(session.players, next.players);
    }

    #[tokio::test]
    async fn missing_documents_are_reported() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        assert!(store.find_session(id).await.unwrap().is_none());
        assert!(
            !store
                .apply_session_patch(id, SessionPatch::Suspend)
                .await
                .unwrap()
        );
        let empty = RosterSnapshot {
            players: vec![],
            teams: vec![],
        };
        assert_eq!(
            store
                .replace_roster_if(id, empty.clone(), empty)
                .await
                .unwrap(),
            RosterWrite::Missing
        );
    }

    #[tokio::test]
    async fn board_game_prefix_search() {
        let catalog = vec![
            board_game("Carcassonne"),
            board_game("Catan"),
            board_game("Terraforming Mars"),
        ];
        let store = MemoryRecordStore::new().with_board_games(catalog);

        let hits = store
            .find_board_games_by_name("Ca".into())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|game| game.name.starts_with("Ca")));
        assert_eq!(store.list_board_games().await.unwrap().len(), 3);
    }

    fn board_game(name: &str) -> BoardGameEntity {
        BoardGameEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            module_name: "module".into(),
            package_name: "com.example".into(),
            activity_name: "Main".into(),
            min_playing_time: 30,
            max_playing_time: 90,
            min_number_of_players: 2,
            max_number_of_players: 5,
            publishers: vec![],
            artists: vec![],
            designers: vec![],
        }
    }
}
