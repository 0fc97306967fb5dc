use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, MongoOrderDocument, doc_id, lifecycle_tag, uuid_as_binary},
};
use crate::dao::{
    catalog_store::CatalogStore,
    models::{GameEntity, GameLifecycle, OrderEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const ORDER_COLLECTION_NAME: &str = "orders";

#[derive(Clone)]
pub struct MongoCatalogStore {
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

/// True when the error is a unique-index duplicate-key rejection.
fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}

impl MongoCatalogStore {
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

        // The unique index on the transaction reference is the idempotency
        // guarantee for entitlement creation. Every duplicate verification
        // path funnels into an E11000 here.
        let order_collection =
            database.collection::<mongodb::bson::Document>(ORDER_COLLECTION_NAME);
        let reference_index = mongodb::IndexModel::builder()
            .keys(doc! {"reference": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("order_reference_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        order_collection
            .create_index(reference_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ORDER_COLLECTION_NAME,
                index: "reference",
                source,
            })?;

        let access_index = mongodb::IndexModel::builder()
            .keys(doc! {"user_id": 1, "game_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("order_user_game_idx".to_owned()))
                    .build(),
            )
            .build();

        order_collection
            .create_index(access_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ORDER_COLLECTION_NAME,
                index: "user_id,game_id",
                source,
            })?;

        let game_collection = database.collection::<mongodb::bson::Document>(GAME_COLLECTION_NAME);
        let lifecycle_index = mongodb::IndexModel::builder()
            .keys(doc! {"lifecycle": 1, "created_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_lifecycle_idx".to_owned()))
                    .build(),
            )
            .build();

        game_collection
            .create_index(lifecycle_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "lifecycle,created_at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn game_collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn order_collection(&self) -> Collection<MongoOrderDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoOrderDocument>(ORDER_COLLECTION_NAME)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let collection = self.game_collection().await;
        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let collection = self.game_collection().await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn list_games(&self, lifecycle: Option<GameLifecycle>) -> MongoResult<Vec<GameEntity>> {
        let collection = self.game_collection().await;

        let filter = match lifecycle {
            Some(state) => doc! {"lifecycle": lifecycle_tag(state)},
            None => doc! {},
        };

        let documents: Vec<MongoGameDocument> = collection
            .find(filter)
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let collection = self.game_collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn purge_archived_before(&self, cutoff: SystemTime) -> MongoResult<u64> {
        let collection = self.game_collection().await;
        let result = collection
            .delete_many(doc! {
                "lifecycle": lifecycle_tag(GameLifecycle::Archived),
                "archived_at": { "$lt": DateTime::from_system_time(cutoff) },
            })
            .await
            .map_err(|source| MongoDaoError::PurgeArchived { source })?;
        Ok(result.deleted_count)
    }

    async fn insert_order(&self, order: OrderEntity) -> MongoResult<()> {
        let reference = order.reference.clone();
        let document: MongoOrderDocument = order.into();
        let collection = self.order_collection().await;

        collection.insert_one(&document).await.map_err(|source| {
            if is_duplicate_key(&source) {
                MongoDaoError::DuplicateOrder { reference }
            } else {
                MongoDaoError::SaveOrder { reference, source }
            }
        })?;

        Ok(())
    }

    async fn find_order_by_reference(&self, reference: String) -> MongoResult<Option<OrderEntity>> {
        let collection = self.order_collection().await;

        let document = collection
            .find_one(doc! {"reference": &reference})
            .await
            .map_err(|source| MongoDaoError::LoadOrder { reference, source })?;

        Ok(document.map(Into::into))
    }

    async fn find_order_for_user_game(
        &self,
        user_id: String,
        game_id: Uuid,
    ) -> MongoResult<Option<OrderEntity>> {
        let collection = self.order_collection().await;

        let document = collection
            .find_one(doc! {"user_id": &user_id, "game_id": uuid_as_binary(game_id)})
            .await
            .map_err(|source| MongoDaoError::ListOrders { user_id, source })?;

        Ok(document.map(Into::into))
    }

    async fn list_orders_for_user(&self, user_id: String) -> MongoResult<Vec<OrderEntity>> {
        let collection = self.order_collection().await;

        let documents: Vec<MongoOrderDocument> = collection
            .find(doc! {"user_id": &user_id})
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListOrders {
                user_id: user_id.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListOrders { user_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn count_orders_for_game(&self, game_id: Uuid) -> MongoResult<u64> {
        let collection = self.order_collection().await;

        collection
            .count_documents(doc! {"game_id": uuid_as_binary(game_id)})
            .await
            .map_err(|source| MongoDaoError::CountOrders { game_id, source })
    }
}

impl CatalogStore for MongoCatalogStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(
        &self,
        lifecycle: Option<GameLifecycle>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(lifecycle).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn purge_archived_before(&self, cutoff: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .purge_archived_before(cutoff)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_order(&self, order: OrderEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_order(order).await.map_err(Into::into) })
    }

    fn find_order_by_reference(
        &self,
        reference: String,
    ) -> BoxFuture<'static, StorageResult<Option<OrderEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_order_by_reference(reference)
                .await
                .map_err(Into::into)
        })
    }

    fn find_order_for_user_game(
        &self,
        user_id: String,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<OrderEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_order_for_user_game(user_id, game_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_orders_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<OrderEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_orders_for_user(user_id).await.map_err(Into::into) })
    }

    fn count_orders_for_game(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .count_orders_for_game(game_id)
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
