//! Session lifecycle and dual-store synchronization coordinator.
//!
//! Every multi-store operation here performs at most two sequential store
//! round trips, record store first. There is no cross-store transaction: when
//! the second write fails the first is deliberately left in place as
//! forward-recoverable state and the caller retries the operation
//! ([`ServiceError::Partial`]). Rolling back the committed half would open a
//! second partial-failure window.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        live_store::LiveStore,
        models::{
            GameSessionEntity, LiveSessionEntity, NewGameSession, RosterSnapshot, RosterWrite,
            SessionPatch, SessionStatus,
        },
        record_store::RecordStore,
        storage::StorageError,
    },
    error::{ServiceError, StoreSide},
    ident::{self, PlayerRef},
    state::{
        SharedState,
        machine::{self, SessionEvent},
    },
};

/// Coordinates ordered writes across the record and live stores.
///
/// Store handles are injected so tests can substitute in-memory fakes
/// implementing the same contracts.
pub struct SessionCoordinator {
    record: Arc<dyn RecordStore>,
    live: Arc<dyn LiveStore>,
    max_roster_size: usize,
    roster_retry_attempts: u32,
}

impl SessionCoordinator {
    /// Build a coordinator over explicit store handles.
    pub fn new(record: Arc<dyn RecordStore>, live: Arc<dyn LiveStore>, config: &AppConfig) -> Self {
        Self {
            record,
            live,
            max_roster_size: config.max_roster_size,
            roster_retry_attempts: config.roster_retry_attempts,
        }
    }

    /// Build a coordinator from the shared state, failing while degraded.
    pub async fn from_state(state: &SharedState) -> Result<Self, ServiceError> {
        let record = state.require_record_store().await?;
        let live = state.require_live_store().await?;
        Ok(Self::new(record, live, state.config()))
    }

    /// Create a session in both stores and return the store-assigned id.
    ///
    /// The record document is written first. If the live mirror write fails
    /// afterwards the record is left as a detectable orphan (roster present
    /// in the record store, `session_<id>` absent in the live store) and can
    /// be completed by replaying the live write.
    pub async fn create_session(
        &self,
        admin_id: String,
        board_game_id: String,
        players: Vec<PlayerRef>,
        starting_points: u32,
        teams: Vec<PlayerRef>,
    ) -> Result<Uuid, ServiceError> {
        if admin_id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "admin id must not be empty".into(),
            ));
        }
        if board_game_id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "board game id must not be empty".into(),
            ));
        }
        if players.is_empty() {
            return Err(ServiceError::InvalidInput(
                "a session requires at least one player".into(),
            ));
        }
        if players.len() > self.max_roster_size {
            return Err(ServiceError::InvalidInput(format!(
                "roster exceeds the configured limit of {} players",
                self.max_roster_size
            )));
        }
        let mut seen = HashSet::new();
        for player in &players {
            if !seen.insert(player) {
                return Err(ServiceError::InvalidInput(format!(
                    "duplicate player ref `{player}` in roster"
                )));
            }
        }

        let live_mirror = LiveSessionEntity::initial(&players, starting_points);
        let session = NewGameSession {
            admin_id,
            board_game_id,
            players,
            teams,
            starting_points,
            start_time: SystemTime::now(),
        };

        let id = self.record.create_session(session).await?;

        self.live
            .set(ident::live_session_path(id), Value::from(&live_mirror))
            .await
            .map_err(|source| {
                warn!(session_id = %id, error = %source, "live mirror creation failed after record write");
                partial_live(
                    source,
                    format!("record session `{id}` created; replay the live mirror write"),
                )
            })?;

        Ok(id)
    }

    /// Move the session to `ACTIVE`, refreshing its start time.
    pub async fn activate(&self, id: Uuid) -> Result<SessionStatus, ServiceError> {
        self.apply_lifecycle(id, SessionEvent::Activate).await
    }

    /// Move the session to `SUSPENDED`. The live board stays visible:
    /// suspension pauses scoring semantics, not visibility.
    pub async fn suspend(&self, id: Uuid) -> Result<SessionStatus, ServiceError> {
        self.apply_lifecycle(id, SessionEvent::Suspend).await
    }

    /// Move the session to the terminal `ENDED` state and hide the live board.
    pub async fn end(&self, id: Uuid) -> Result<SessionStatus, ServiceError> {
        self.apply_lifecycle(id, SessionEvent::End).await
    }

    async fn apply_lifecycle(
        &self,
        id: Uuid,
        event: SessionEvent,
    ) -> Result<SessionStatus, ServiceError> {
        let session = self.fetch_session(id).await?;
        let next = machine::next_status(session.status, event)?;

        let patch = match event {
            SessionEvent::Activate => SessionPatch::Activate {
                start_time: SystemTime::now(),
            },
            SessionEvent::Suspend => SessionPatch::Suspend,
            SessionEvent::End => SessionPatch::End {
                end_time: SystemTime::now(),
            },
        };

        if !self.record.apply_session_patch(id, patch).await? {
            return Err(not_found(id));
        }

        let active = next != SessionStatus::Ended;
        self.live
            .set(ident::live_active_path(id), json!(active))
            .await
            .map_err(|source| {
                warn!(session_id = %id, event = ?event, error = %source, "live flag write failed after record transition");
                partial_live(
                    source,
                    format!("record status is `{next:?}`; retry the operation to converge the live flag"),
                )
            })?;

        Ok(next)
    }

    /// Add a player to the roster (set-union, idempotent) and score them in
    /// the live store. Record-store-first ordering means a rostered but
    /// unscored player is the only reachable inconsistency, and it reads as
    /// "joining".
    pub async fn add_player(
        &self,
        id: Uuid,
        player: PlayerRef,
        initial_points: u32,
    ) -> Result<(), ServiceError> {
        let session = self.fetch_session(id).await?;
        if !session.players.contains(&player) && session.players.len() >= self.max_roster_size {
            return Err(ServiceError::InvalidInput(format!(
                "roster exceeds the configured limit of {} players",
                self.max_roster_size
            )));
        }

        if !self.record.add_roster_member(id, player.clone()).await? {
            return Err(not_found(id));
        }

        self.live
            .set(
                ident::player_points_path(id, player.player_id()),
                json!(i64::from(initial_points)),
            )
            .await
            .map_err(|source| {
                warn!(session_id = %id, player = %player, error = %source, "live points write failed after roster join");
                partial_live(
                    source,
                    format!(
                        "player `{player}` rostered; retry to write their starting points"
                    ),
                )
            })?;

        Ok(())
    }

    /// Remove the first exact roster match of `player` from both sequences,
    /// then drop their live points entry.
    ///
    /// The write is a compare-and-swap replace with bounded retries, so
    /// concurrent removals of different players cannot resurrect each other.
    /// Removing a player who is not rostered is a no-op success.
    pub async fn remove_player(&self, id: Uuid, player: PlayerRef) -> Result<(), ServiceError> {
        let mut attempts = 0;
        loop {
            let session = self.fetch_session(id).await?;
            let expected = RosterSnapshot::from(&session);

            let next = RosterSnapshot {
                players: strip_first(&session.players, &player),
                teams: strip_first(&session.teams, &player),
            };
            if next == expected {
                // Not rostered; nothing to converge on the live side either,
                // since points keys are a subset of the roster.
                return Ok(());
            }

            match self.record.replace_roster_if(id, expected, next).await? {
                RosterWrite::Applied => break,
                RosterWrite::Missing => return Err(not_found(id)),
                RosterWrite::Conflict => {
                    attempts += 1;
                    if attempts >= self.roster_retry_attempts {
                        return Err(ServiceError::InvalidState(format!(
                            "roster of session `{id}` kept changing concurrently; retry"
                        )));
                    }
                }
            }
        }

        self.live
            .set(ident::player_points_path(id, player.player_id()), Value::Null)
            .await
            .map_err(|source| {
                warn!(session_id = %id, player = %player, error = %source, "live points removal failed after roster write");
                partial_live(
                    source,
                    format!("player `{player}` unrostered; retry to drop their live points"),
                )
            })?;

        Ok(())
    }

    /// Record winners and losers once the game is decided. Both lists must be
    /// disjoint subsets of the roster. Record store only.
    pub async fn record_outcome(
        &self,
        id: Uuid,
        winners: Vec<PlayerRef>,
        losers: Vec<PlayerRef>,
    ) -> Result<(), ServiceError> {
        let session = self.fetch_session(id).await?;

        let winner_set: HashSet<&PlayerRef> = winners.iter().collect();
        for loser in &losers {
            if winner_set.contains(loser) {
                return Err(ServiceError::InvalidInput(format!(
                    "player `{loser}` cannot both win and lose"
                )));
            }
        }
        for player in winners.iter().chain(losers.iter()) {
            if !session.players.contains(player) {
                return Err(ServiceError::InvalidInput(format!(
                    "player `{player}` is not on the roster"
                )));
            }
        }

        if !self
            .record
            .apply_session_patch(id, SessionPatch::Outcome { winners, losers })
            .await?
        {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Atomically add `delta` to one player's points.
    ///
    /// This is the hot path: a single server-resolved increment against the
    /// live store, no record-store interaction, no read-modify-write.
    /// Concurrent deltas commute and none are lost.
    pub async fn increment_points(
        &self,
        id: Uuid,
        player_id: &str,
        delta: i64,
    ) -> Result<(), ServiceError> {
        validate_player_id_segment(player_id)?;
        self.live
            .increment(ident::player_points_path(id, player_id), delta)
            .await?;
        Ok(())
    }

    /// Overwrite one player's points with an absolute value.
    ///
    /// Last-writer-wins; unlike [`Self::increment_points`] this is not safe
    /// for concurrent callers targeting the same player.
    pub async fn set_points(
        &self,
        id: Uuid,
        player_id: &str,
        points: u32,
    ) -> Result<(), ServiceError> {
        validate_player_id_segment(player_id)?;
        self.live
            .set(
                ident::player_points_path(id, player_id),
                json!(i64::from(points)),
            )
            .await?;
        Ok(())
    }

    /// Fetch the record-store half of a session.
    pub async fn get_session(&self, id: Uuid) -> Result<GameSessionEntity, ServiceError> {
        self.fetch_session(id).await
    }

    /// Fetch the live-store half of a session.
    pub async fn get_live_session(&self, id: Uuid) -> Result<LiveSessionEntity, ServiceError> {
        let path = ident::live_session_path(id);
        let Some(value) = self.live.get(path.clone()).await? else {
            return Err(not_found(id));
        };
        let live = serde_json::from_value(value)
            .map_err(|source| ServiceError::from(StorageError::corrupt(path, source)))?;
        Ok(live)
    }

    /// Fetch both halves, or fail. A session whose live mirror is missing
    /// (a partially created orphan) reports `NotFound`; the composite is
    /// never half-populated.
    pub async fn get_full_session(
        &self,
        id: Uuid,
    ) -> Result<(GameSessionEntity, LiveSessionEntity), ServiceError> {
        let session = self.fetch_session(id).await?;
        let live = self.get_live_session(id).await?;
        Ok((session, live))
    }

    async fn fetch_session(&self, id: Uuid) -> Result<GameSessionEntity, ServiceError> {
        self.record
            .find_session(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("session `{id}` not found"))
}

fn partial_live(source: StorageError, recovery: String) -> ServiceError {
    ServiceError::Partial {
        committed: StoreSide::Record,
        recovery,
        source,
    }
}

/// Copy of `roster` with the first exact match of `player` removed.
/// Duplicate refs are not expected; only the first is stripped.
fn strip_first(roster: &[PlayerRef], player: &PlayerRef) -> Vec<PlayerRef> {
    let mut stripped = Vec::with_capacity(roster.len());
    let mut removed = false;
    for member in roster {
        if !removed && member == player {
            removed = true;
            continue;
        }
        stripped.push(member.clone());
    }
    stripped
}

/// Live paths are slash-separated, so a player id used as a path segment must
/// not smuggle separators in.
fn validate_player_id_segment(player_id: &str) -> Result<(), ServiceError> {
    if player_id.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player id must not be empty".into(),
        ));
    }
    if player_id.contains(['/', '|']) {
        return Err(ServiceError::InvalidInput(format!(
            "player id `{player_id}` contains reserved characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use serde_json::Map;

    use super::*;
    use crate::dao::{
        live_store::memory::MemoryLiveStore,
        models::{BoardGameEntity, NewGameSession},
        record_store::memory::MemoryRecordStore,
        storage::StorageResult,
    };

    #[derive(Debug, thiserror::Error)]
    #[error("injected outage")]
    struct InjectedOutage;

    /// Live store whose writes always fail, simulating an outage after the
    /// record write committed.
    #[derive(Clone)]
    struct FailingLiveStore {
        inner: MemoryLiveStore,
    }

    impl FailingLiveStore {
        fn new() -> Self {
            Self {
                inner: MemoryLiveStore::new(),
            }
        }

        fn outage() -> StorageError {
            StorageError::unavailable("live store unreachable".into(), InjectedOutage)
        }
    }

    impl LiveStore for FailingLiveStore {
        fn get(&self, path: String) -> BoxFuture<'static, StorageResult<Option<Value>>> {
            self.inner.get(path)
        }

        fn set(&self, _path: String, _value: Value) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(Self::outage()) })
        }

        fn update(
            &self,
            _path: String,
            _entries: Map<String, Value>,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(Self::outage()) })
        }

        fn increment(&self, _path: String, _delta: i64) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(Self::outage()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    /// Record store that reports roster conflicts a fixed number of times
    /// before delegating, to exercise the compare-and-swap retry loop.
    #[derive(Clone)]
    struct ConflictingRecordStore {
        inner: MemoryRecordStore,
        conflicts_left: Arc<std::sync::atomic::AtomicU32>,
    }

    impl ConflictingRecordStore {
        fn new(inner: MemoryRecordStore, conflicts: u32) -> Self {
            Self {
                inner,
                conflicts_left: Arc::new(std::sync::atomic::AtomicU32::new(conflicts)),
            }
        }
    }

    impl RecordStore for ConflictingRecordStore {
        fn create_session(
            &self,
            session: NewGameSession,
        ) -> BoxFuture<'static, StorageResult<Uuid>> {
            self.inner.create_session(session)
        }

        fn find_session(
            &self,
            id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>> {
            self.inner.find_session(id)
        }

        fn apply_session_patch(
            &self,
            id: Uuid,
            patch: SessionPatch,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.apply_session_patch(id, patch)
        }

        fn add_roster_member(
            &self,
            id: Uuid,
            player: PlayerRef,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.add_roster_member(id, player)
        }

        fn replace_roster_if(
            &self,
            id: Uuid,
            expected: RosterSnapshot,
            next: RosterSnapshot,
        ) -> BoxFuture<'static, StorageResult<RosterWrite>> {
            use std::sync::atomic::Ordering;
            let remaining = &self.conflicts_left;
            if remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                    left.checked_sub(1)
                })
                .is_ok()
            {
                return Box::pin(async { Ok(RosterWrite::Conflict) });
            }
            self.inner.replace_roster_if(id, expected, next)
        }

        fn list_board_games(&self) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>> {
            self.inner.list_board_games()
        }

        fn find_board_games_by_name(
            &self,
            prefix: String,
        ) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>> {
            self.inner.find_board_games_by_name(prefix)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    fn player(id: &str) -> PlayerRef {
        PlayerRef::new(id, format!("{id}@example.com")).unwrap()
    }

    fn coordinator() -> SessionCoordinator {
        SessionCoordinator::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryLiveStore::new()),
            &AppConfig::default(),
        )
    }

    async fn created_session(
        coordinator: &SessionCoordinator,
        players: Vec<PlayerRef>,
        starting_points: u32,
    ) -> Uuid {
        coordinator
            .create_session(
                "admin-1".into(),
                "bg-1".into(),
                players.clone(),
                starting_points,
                players,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_seeds_both_stores() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1"), player("p2")], 10).await;

        let session = coordinator.get_session(id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Created);
        assert_eq!(session.players, vec![player("p1"), player("p2")]);
        assert_eq!(session.teams, vec![player("p1"), player("p2")]);
        assert!(session.winners.is_empty());
        assert!(session.start_time.is_some());
        assert!(session.end_time.is_none());

        let live = coordinator.get_live_session(id).await.unwrap();
        assert!(live.active);
        assert_eq!(live.points.get("p1"), Some(&10));
        assert_eq!(live.points.get("p2"), Some(&10));
        assert_eq!(live.points.len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let coordinator = coordinator();
        let err = coordinator
            .create_session("".into(), "bg".into(), vec![player("p1")], 10, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = coordinator
            .create_session("admin".into(), "bg".into(), vec![], 10, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = coordinator
            .create_session(
                "admin".into(),
                "bg".into(),
                vec![player("p1"), player("p1")],
                10,
                vec![],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn create_partial_failure_leaves_detectable_orphan() {
        let record = Arc::new(MemoryRecordStore::new());
        let coordinator = SessionCoordinator::new(
            record.clone(),
            Arc::new(FailingLiveStore::new()),
            &AppConfig::default(),
        );

        let err = coordinator
            .create_session(
                "admin-1".into(),
                "bg-1".into(),
                vec![player("p1")],
                10,
                vec![player("p1")],
            )
            .await
            .unwrap_err();
        let ServiceError::Partial { committed, .. } = err else {
            panic!("expected partial failure, got {err:?}");
        };
        assert_eq!(committed, StoreSide::Record);

        // The orphan is detectable: record document exists, live mirror does not.
        let sessions = record.session_ids();
        assert_eq!(sessions.len(), 1);
        let healthy = SessionCoordinator::new(
            record,
            Arc::new(MemoryLiveStore::new()),
            &AppConfig::default(),
        );
        assert!(healthy.get_session(sessions[0]).await.is_ok());
        let err = healthy.get_live_session(sessions[0]).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn lifecycle_chain_updates_both_stores() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1")], 5).await;

        assert_eq!(
            coordinator.activate(id).await.unwrap(),
            SessionStatus::Active
        );
        let after_activate = coordinator.get_session(id).await.unwrap();
        let start_time = after_activate.start_time.unwrap();

        assert_eq!(
            coordinator.suspend(id).await.unwrap(),
            SessionStatus::Suspended
        );
        let after_suspend = coordinator.get_session(id).await.unwrap();
        // Suspend never touches the start timestamp.
        assert_eq!(after_suspend.start_time, Some(start_time));
        // Suspension keeps the live board visible.
        assert!(coordinator.get_live_session(id).await.unwrap().active);

        assert_eq!(
            coordinator.activate(id).await.unwrap(),
            SessionStatus::Active
        );
        assert!(coordinator.get_live_session(id).await.unwrap().active);

        assert_eq!(coordinator.end(id).await.unwrap(), SessionStatus::Ended);
        let ended = coordinator.get_session(id).await.unwrap();
        assert_eq!(ended.status, SessionStatus::Ended);
        assert!(ended.end_time.is_some());
        assert!(!coordinator.get_live_session(id).await.unwrap().active);
    }

    #[tokio::test]
    async fn ended_rejects_further_transitions() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1")], 5).await;
        coordinator.activate(id).await.unwrap();
        coordinator.end(id).await.unwrap();

        assert!(matches!(
            coordinator.activate(id).await.unwrap_err(),
            ServiceError::InvalidState(_)
        ));
        assert!(matches!(
            coordinator.suspend(id).await.unwrap_err(),
            ServiceError::InvalidState(_)
        ));
        // Re-ending is the idempotent retry path and stays allowed.
        assert_eq!(coordinator.end(id).await.unwrap(), SessionStatus::Ended);
    }

    #[tokio::test]
    async fn lifecycle_on_unknown_session_is_not_found() {
        let coordinator = coordinator();
        assert!(matches!(
            coordinator.activate(Uuid::new_v4()).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn transition_partial_failure_reports_retry() {
        let record = Arc::new(MemoryRecordStore::new());
        let seed = SessionCoordinator::new(
            record.clone(),
            Arc::new(MemoryLiveStore::new()),
            &AppConfig::default(),
        );
        let id = created_session(&seed, vec![player("p1")], 5).await;

        let flaky = SessionCoordinator::new(
            record.clone(),
            Arc::new(FailingLiveStore::new()),
            &AppConfig::default(),
        );
        let err = flaky.activate(id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Partial { .. }));

        // The record side committed; retrying against a healthy live store
        // converges both sides.
        assert_eq!(
            record
                .find_session(id)
                .await
                .unwrap()
                .unwrap()
                .status,
            SessionStatus::Active
        );
        assert_eq!(seed.activate(id).await.unwrap(), SessionStatus::Active);
        assert!(seed.get_live_session(id).await.unwrap().active);
    }

    #[tokio::test]
    async fn add_player_rosters_then_scores() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1")], 10).await;

        coordinator
            .add_player(id, player("p2"), 7)
            .await
            .unwrap();

        let session = coordinator.get_session(id).await.unwrap();
        assert_eq!(session.players, vec![player("p1"), player("p2")]);
        assert_eq!(session.teams, vec![player("p1"), player("p2")]);
        let live = coordinator.get_live_session(id).await.unwrap();
        assert_eq!(live.points.get("p2"), Some(&7));

        // Re-adding is a set-union no-op on the roster.
        coordinator
            .add_player(id, player("p2"), 7)
            .await
            .unwrap();
        let session = coordinator.get_session(id).await.unwrap();
        assert_eq!(session.players.len(), 2);
    }

    #[tokio::test]
    async fn remove_player_strips_both_sequences() {
        let coordinator = coordinator();
        let roster = vec![player("p1"), player("p2"), player("p3")];
        let id = created_session(&coordinator, roster, 10).await;

        coordinator.remove_player(id, player("p1")).await.unwrap();

        let session = coordinator.get_session(id).await.unwrap();
        assert_eq!(session.players, vec![player("p2"), player("p3")]);
        assert_eq!(session.teams, vec![player("p2"), player("p3")]);
        let live = coordinator.get_live_session(id).await.unwrap();
        assert!(!live.points.contains_key("p1"));
        assert_eq!(live.points.len(), 2);
    }

    #[tokio::test]
    async fn remove_absent_player_is_noop_success() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1")], 10).await;

        coordinator.remove_player(id, player("p9")).await.unwrap();
        assert_eq!(coordinator.get_session(id).await.unwrap().players.len(), 1);
    }

    #[tokio::test]
    async fn remove_player_retries_conflicts_then_succeeds() {
        let inner = MemoryRecordStore::new();
        let record = Arc::new(ConflictingRecordStore::new(inner, 1));
        let coordinator = SessionCoordinator::new(
            record,
            Arc::new(MemoryLiveStore::new()),
            &AppConfig::default(),
        );
        let id = created_session(&coordinator, vec![player("p1"), player("p2")], 10).await;

        coordinator.remove_player(id, player("p2")).await.unwrap();
        assert_eq!(
            coordinator.get_session(id).await.unwrap().players,
            vec![player("p1")]
        );
    }

    #[tokio::test]
    async fn remove_player_gives_up_after_retry_budget() {
        let inner = MemoryRecordStore::new();
        let record = Arc::new(ConflictingRecordStore::new(inner, u32::MAX));
        let coordinator = SessionCoordinator::new(
            record,
            Arc::new(MemoryLiveStore::new()),
            &AppConfig::default(),
        );
        let id = created_session(&coordinator, vec![player("p1"), player("p2")], 10).await;

        let err = coordinator
            .remove_player(id, player("p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn concurrent_increments_are_never_lost() {
        let coordinator = Arc::new(coordinator());
        let id = created_session(&coordinator, vec![player("p1")], 10).await;

        let deltas: Vec<i64> = vec![3, -1, 4, 1, -5, 9, 2, -6, 5, 3];
        let mut handles = Vec::new();
        for delta in deltas.clone() {
            let coordinator = Arc::clone(&coordinator);
            handles.push(tokio::spawn(async move {
                coordinator.increment_points(id, "p1", delta).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let live = coordinator.get_live_session(id).await.unwrap();
        let expected = 10 + deltas.iter().sum::<i64>();
        assert_eq!(live.points.get("p1"), Some(&expected));
    }

    #[tokio::test]
    async fn set_points_overwrites_absolute_value() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1")], 10).await;

        coordinator.set_points(id, "p1", 42).await.unwrap();
        let live = coordinator.get_live_session(id).await.unwrap();
        assert_eq!(live.points.get("p1"), Some(&42));
    }

    #[tokio::test]
    async fn point_mutations_reject_malformed_player_ids() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1")], 10).await;

        for bad in ["", "p/1", "p|1"] {
            assert!(matches!(
                coordinator.increment_points(id, bad, 1).await.unwrap_err(),
                ServiceError::InvalidInput(_)
            ));
        }
    }

    #[tokio::test]
    async fn record_outcome_validates_roster_and_disjointness() {
        let coordinator = coordinator();
        let id = created_session(&coordinator, vec![player("p1"), player("p2")], 10).await;

        let err = coordinator
            .record_outcome(id, vec![player("p1")], vec![player("p1")])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = coordinator
            .record_outcome(id, vec![player("p9")], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        coordinator
            .record_outcome(id, vec![player("p1")], vec![player("p2")])
            .await
            .unwrap();
        let session = coordinator.get_session(id).await.unwrap();
        assert_eq!(session.winners, vec![player("p1")]);
        assert_eq!(session.losers, vec![player("p2")]);
    }

    #[tokio::test]
    async fn full_session_requires_both_halves() {
        let record = Arc::new(MemoryRecordStore::new());
        let broken = SessionCoordinator::new(
            record.clone(),
            Arc::new(FailingLiveStore::new()),
            &AppConfig::default(),
        );

        // Simulated partial creation: record half exists, live half missing.
        let err = broken
            .create_session(
                "admin-1".into(),
                "bg-1".into(),
                vec![player("p1")],
                10,
                vec![player("p1")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Partial { .. }));

        let reader = SessionCoordinator::new(
            record.clone(),
            Arc::new(MemoryLiveStore::new()),
            &AppConfig::default(),
        );
        let sessions = record.session_ids();
        let orphan = sessions[0];
        assert!(reader.get_session(orphan).await.is_ok());
        assert!(matches!(
            reader.get_live_session(orphan).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            reader.get_full_session(orphan).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
