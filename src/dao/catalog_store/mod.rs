#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use crate::dao::models::{GameEntity, GameLifecycle, OrderEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for the game catalog and the
/// entitlement ledger.
///
/// Implementations must enforce uniqueness of `OrderEntity::reference` at
/// the storage layer: [`CatalogStore::insert_order`] returns
/// [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict)
/// when a row for the same reference already exists, regardless of which
/// process wrote it first.
pub trait CatalogStore: Send + Sync {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn list_games(
        &self,
        lifecycle: Option<GameLifecycle>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Permanently delete archived games whose `archived_at` lies strictly
    /// before `cutoff`, returning how many were removed.
    fn purge_archived_before(
        &self,
        cutoff: SystemTime,
    ) -> BoxFuture<'static, StorageResult<u64>>;

    fn insert_order(&self, order: OrderEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_order_by_reference(
        &self,
        reference: String,
    ) -> BoxFuture<'static, StorageResult<Option<OrderEntity>>>;
    fn find_order_for_user_game(
        &self,
        user_id: String,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<OrderEntity>>>;
    fn list_orders_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<OrderEntity>>>;
    fn count_orders_for_game(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
