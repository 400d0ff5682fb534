use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, doc, serialize_to_bson as to_bson},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoBoardGameDocument, MongoSessionDocument, doc_id, encoded_roster, status_str,
        uuid_as_binary,
    },
};
use crate::dao::{
    models::{
        BoardGameEntity, GameSessionEntity, NewGameSession, RosterSnapshot, RosterWrite,
        SessionPatch, SessionStatus, Timestamp,
    },
    record_store::RecordStore,
    storage::StorageResult,
};
use crate::ident::PlayerRef;

const SESSION_COLLECTION_NAME: &str = "game_sessions";
const BOARD_GAME_COLLECTION_NAME: &str = "board_games";

/// Sentinel appended to a prefix to form the upper bound of a name range scan.
const PREFIX_RANGE_END: char = '\u{f8ff}';

/// MongoDB-backed record store.
#[derive(Clone)]
pub struct MongoRecordStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRecordStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let catalog = database.collection::<MongoBoardGameDocument>(BOARD_GAME_COLLECTION_NAME);
        let name_index = mongodb::IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("board_game_name_idx".to_owned()))
                    .build(),
            )
            .build();
        catalog
            .create_index(name_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: BOARD_GAME_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        let sessions = database.collection::<MongoSessionDocument>(SESSION_COLLECTION_NAME);
        let admin_index = mongodb::IndexModel::builder()
            .keys(doc! {"admin_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("session_admin_idx".to_owned()))
                    .build(),
            )
            .build();
        sessions
            .create_index(admin_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SESSION_COLLECTION_NAME,
                index: "admin_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn session_collection(&self) -> Collection<MongoSessionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoSessionDocument>(SESSION_COLLECTION_NAME)
    }

    async fn board_game_collection(&self) -> Collection<MongoBoardGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoBoardGameDocument>(BOARD_GAME_COLLECTION_NAME)
    }

    async fn create_session(&self, session: NewGameSession) -> MongoResult<Uuid> {
        let id = Uuid::new_v4();
        let document = MongoSessionDocument::new(id, session);
        let collection = self.session_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::CreateSession { source })?;
        Ok(id)
    }

    async fn find_session(&self, id: Uuid) -> MongoResult<Option<GameSessionEntity>> {
        let collection = self.session_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadSession { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn apply_session_patch(&self, id: Uuid, patch: SessionPatch) -> MongoResult<bool> {
        let set = patch_document(id, &patch)?;
        let collection = self.session_collection().await;
        let outcome = collection
            .update_one(doc_id(id), doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::PatchSession { id, source })?;
        Ok(outcome.matched_count > 0)
    }

    async fn add_roster_member(&self, id: Uuid, player: PlayerRef) -> MongoResult<bool> {
        let encoded = player.encode();
        let collection = self.session_collection().await;
        let outcome = collection
            .update_one(
                doc_id(id),
                doc! {"$addToSet": {"players": &encoded, "teams": &encoded}},
            )
            .await
            .map_err(|source| MongoDaoError::RosterWrite { id, source })?;
        Ok(outcome.matched_count > 0)
    }

    async fn replace_roster_if(
        &self,
        id: Uuid,
        expected: RosterSnapshot,
        next: RosterSnapshot,
    ) -> MongoResult<RosterWrite> {
        let collection = self.session_collection().await;
        // Exact array equality in the filter makes this a write-if-unchanged.
        let filter = doc! {
            "_id": uuid_as_binary(id),
            "players": encoded_roster(&expected.players),
            "teams": encoded_roster(&expected.teams),
        };
        let update = doc! {"$set": {
            "players": encoded_roster(&next.players),
            "teams": encoded_roster(&next.teams),
        }};

        let outcome = collection
            .update_one(filter, update)
            .await
            .map_err(|source| MongoDaoError::RosterWrite { id, source })?;
        if outcome.matched_count > 0 {
            return Ok(RosterWrite::Applied);
        }

        // Distinguish a lost race from a missing document.
        match self.find_session(id).await? {
            Some(_) => Ok(RosterWrite::Conflict),
            None => Ok(RosterWrite::Missing),
        }
    }

    async fn list_board_games(&self) -> MongoResult<Vec<BoardGameEntity>> {
        let collection = self.board_game_collection().await;
        let documents: Vec<MongoBoardGameDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListBoardGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListBoardGames { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_board_games_by_name(&self, prefix: String) -> MongoResult<Vec<BoardGameEntity>> {
        let collection = self.board_game_collection().await;
        let range_end = format!("{prefix}{PREFIX_RANGE_END}");
        let documents: Vec<MongoBoardGameDocument> = collection
            .find(doc! {"name": {"$gte": &prefix, "$lte": &range_end}})
            .await
            .map_err(|source| MongoDaoError::SearchBoardGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::SearchBoardGames { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }
}

/// Translate a typed patch into its `$set` document.
fn patch_document(id: Uuid, patch: &SessionPatch) -> MongoResult<mongodb::bson::Document> {
    let document = match patch {
        SessionPatch::Activate { start_time } => doc! {
            "status": status_str(SessionStatus::Active),
            "start_time": timestamp_bson(id, Timestamp::from(*start_time))?,
        },
        SessionPatch::Suspend => doc! {"status": status_str(SessionStatus::Suspended)},
        SessionPatch::End { end_time } => doc! {
            "status": status_str(SessionStatus::Ended),
            "end_time": timestamp_bson(id, Timestamp::from(*end_time))?,
        },
        SessionPatch::Outcome { winners, losers } => doc! {
            "winners": encoded_roster(winners),
            "losers": encoded_roster(losers),
        },
    };
    Ok(document)
}

fn timestamp_bson(id: Uuid, timestamp: Timestamp) -> MongoResult<Bson> {
    to_bson(&timestamp).map_err(|source| MongoDaoError::EncodePatch { id, source })
}

impl RecordStore for MongoRecordStore {
    fn create_session(&self, session: NewGameSession) -> BoxFuture<'static, StorageResult<Uuid>> {
        let store = self.clone();
        Box::pin(async move { store.create_session(session).await.map_err(Into::into) })
    }

    fn find_session(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameSessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_session(id).await.map_err(Into::into) })
    }

    fn apply_session_patch(
        &self,
        id: Uuid,
        patch: SessionPatch,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .apply_session_patch(id, patch)
                .await
                .map_err(Into::into)
        })
    }

    fn add_roster_member(
        &self,
        id: Uuid,
        player: PlayerRef,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .add_roster_member(id, player)
                .await
                .map_err(Into::into)
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
            store
                .replace_roster_if(id, expected, next)
                .await
                .map_err(Into::into)
        })
    }

    fn list_board_games(&self) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_board_games().await.map_err(Into::into) })
    }

    fn find_board_games_by_name(
        &self,
        prefix: String,
    ) -> BoxFuture<'static, StorageResult<Vec<BoardGameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_board_games_by_name(prefix)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
