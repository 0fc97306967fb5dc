use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to purge expired archived games")]
    PurgeArchived {
        #[source]
        source: MongoError,
    },
    /// The unique index on `orders.reference` rejected an insert. Mapped
    /// to a storage conflict so the reconciliation layer can return the
    /// already-stored row.
    #[error("order for transaction reference `{reference}` already recorded")]
    DuplicateOrder { reference: String },
    #[error("failed to save order for reference `{reference}`")]
    SaveOrder {
        reference: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load order for reference `{reference}`")]
    LoadOrder {
        reference: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list orders for user `{user_id}`")]
    ListOrders {
        user_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to count orders for game `{game_id}`")]
    CountOrders {
        game_id: Uuid,
        #[source]
        source: MongoError,
    },
}
