//! Error types shared by the MongoDB record-store implementation.

use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Required environment variable is missing.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The connection URI could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// The client could not be constructed from parsed options.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    /// The initial connectivity ping never succeeded.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        /// Number of ping attempts made.
        attempts: u32,
        #[source]
        source: mongodb::error::Error,
    },
    /// Index creation failed during startup.
    #[error("failed to ensure index `{index}` on `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    /// Inserting a new session document failed.
    #[error("failed to create session document")]
    CreateSession {
        #[source]
        source: mongodb::error::Error,
    },
    /// Loading a session document failed.
    #[error("failed to load session `{id}`")]
    LoadSession {
        /// Session id.
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// Applying a patch to a session document failed.
    #[error("failed to patch session `{id}`")]
    PatchSession {
        /// Session id.
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// A roster mutation against a session document failed.
    #[error("failed roster write on session `{id}`")]
    RosterWrite {
        /// Session id.
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// Listing the board-game catalog failed.
    #[error("failed to list board games")]
    ListBoardGames {
        #[source]
        source: mongodb::error::Error,
    },
    /// Prefix search over the catalog failed.
    #[error("failed to search board games by name")]
    SearchBoardGames {
        #[source]
        source: mongodb::error::Error,
    },
    /// The health ping failed.
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: mongodb::error::Error,
    },
    /// Serializing a typed patch into a BSON document failed.
    #[error("failed to encode patch for session `{id}`")]
    EncodePatch {
        /// Session id.
        id: Uuid,
        #[source]
        source: mongodb::bson::error::Error,
    },
}
