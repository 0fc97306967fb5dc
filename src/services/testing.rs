//! In-memory fakes for exercising the service layer without a database or
//! a payment provider.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};

use futures::future::BoxFuture;
use rust_decimal::Decimal;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        catalog_store::CatalogStore,
        models::{GameEntity, GameLifecycle, MatchEntity, MatchOutcome, OrderEntity},
        storage::{StorageError, StorageResult},
    },
    gateway::{
        ConfirmedTransaction, GatewayError, GatewayResult, InitiatedTransaction, PaymentGateway,
        TransactionMetadata,
    },
    state::{AppState, SharedState},
};

/// In-memory catalog store enforcing the same uniqueness rule as the real
/// backend: inserting a second order for a reference yields a conflict.
#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    games: Arc<Mutex<HashMap<Uuid, GameEntity>>>,
    orders: Arc<Mutex<Vec<OrderEntity>>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game(self, game: GameEntity) -> Self {
        self.games.lock().unwrap().insert(game.id, game);
        self
    }

    pub fn orders(&self) -> Vec<OrderEntity> {
        self.orders.lock().unwrap().clone()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let games = self.games.clone();
        Box::pin(async move {
            games.lock().unwrap().insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let games = self.games.clone();
        Box::pin(async move { Ok(games.lock().unwrap().get(&id).cloned()) })
    }

    fn list_games(
        &self,
        lifecycle: Option<GameLifecycle>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let games = self.games.clone();
        Box::pin(async move {
            let mut listed: Vec<GameEntity> = games
                .lock()
                .unwrap()
                .values()
                .filter(|game| lifecycle.is_none_or(|state| game.lifecycle == state))
                .cloned()
                .collect();
            listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(listed)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let games = self.games.clone();
        Box::pin(async move { Ok(games.lock().unwrap().remove(&id).is_some()) })
    }

    fn purge_archived_before(&self, cutoff: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
        let games = self.games.clone();
        Box::pin(async move {
            let mut guard = games.lock().unwrap();
            let before = guard.len();
            guard.retain(|_, game| {
                !(game.lifecycle == GameLifecycle::Archived
                    && game.archived_at.is_some_and(|at| at < cutoff))
            });
            Ok((before - guard.len()) as u64)
        })
    }

    fn insert_order(&self, order: OrderEntity) -> BoxFuture<'static, StorageResult<()>> {
        let orders = self.orders.clone();
        Box::pin(async move {
            let mut guard = orders.lock().unwrap();
            if guard.iter().any(|row| row.reference == order.reference) {
                return Err(StorageError::conflict(order.reference));
            }
            guard.push(order);
            Ok(())
        })
    }

    fn find_order_by_reference(
        &self,
        reference: String,
    ) -> BoxFuture<'static, StorageResult<Option<OrderEntity>>> {
        let orders = self.orders.clone();
        Box::pin(async move {
            Ok(orders
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.reference == reference)
                .cloned())
        })
    }

    fn find_order_for_user_game(
        &self,
        user_id: String,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<OrderEntity>>> {
        let orders = self.orders.clone();
        Box::pin(async move {
            Ok(orders
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.user_id == user_id && row.game_id == game_id)
                .cloned())
        })
    }

    fn list_orders_for_user(
        &self,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<OrderEntity>>> {
        let orders = self.orders.clone();
        Box::pin(async move {
            let mut listed: Vec<OrderEntity> = orders
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.user_id == user_id)
                .cloned()
                .collect();
            listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(listed)
        })
    }

    fn count_orders_for_game(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let orders = self.orders.clone();
        Box::pin(async move {
            Ok(orders
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.game_id == game_id)
                .count() as u64)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Scripted confirm behaviour for a transaction reference.
#[derive(Clone)]
pub enum ConfirmBehavior {
    Ok(ConfirmedTransaction),
    NotFound,
    Unavailable,
}

/// Programmable payment gateway double.
#[derive(Default)]
pub struct StubGateway {
    confirms: Mutex<HashMap<String, ConfirmBehavior>>,
    initiated: Mutex<Vec<InitiateCall>>,
    /// When set, `confirm_transaction` waits on the barrier before
    /// answering so tests can force concurrent verifications to race.
    barrier: Mutex<Option<Arc<Barrier>>>,
}

/// Arguments captured from a `create_transaction` call.
#[derive(Clone)]
pub struct InitiateCall {
    pub email: String,
    pub amount: Decimal,
    pub metadata: TransactionMetadata,
    pub callback_url: String,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_confirm(&self, reference: &str, behavior: ConfirmBehavior) {
        self.confirms
            .lock()
            .unwrap()
            .insert(reference.to_owned(), behavior);
    }

    pub fn confirm_success(&self, reference: &str, amount: Decimal, metadata: TransactionMetadata) {
        self.script_confirm(
            reference,
            ConfirmBehavior::Ok(ConfirmedTransaction {
                success: true,
                amount,
                metadata: Some(metadata),
                customer_email: Some("buyer@example.com".into()),
            }),
        );
    }

    pub fn set_barrier(&self, barrier: Arc<Barrier>) {
        *self.barrier.lock().unwrap() = Some(barrier);
    }

    pub fn initiated_calls(&self) -> Vec<InitiateCall> {
        self.initiated.lock().unwrap().clone()
    }
}

impl PaymentGateway for StubGateway {
    fn create_transaction(
        &self,
        email: String,
        amount: Decimal,
        metadata: TransactionMetadata,
        callback_url: String,
    ) -> BoxFuture<'static, GatewayResult<InitiatedTransaction>> {
        let call = InitiateCall {
            email,
            amount,
            metadata,
            callback_url,
        };
        let mut guard = self.initiated.lock().unwrap();
        guard.push(call);
        let reference = format!("ps_ref_{}", guard.len());
        Box::pin(async move {
            Ok(InitiatedTransaction {
                authorization_url: format!("https://checkout.test/{reference}"),
                reference,
            })
        })
    }

    fn confirm_transaction(
        &self,
        reference: String,
    ) -> BoxFuture<'static, GatewayResult<ConfirmedTransaction>> {
        let behavior = self.confirms.lock().unwrap().get(&reference).cloned();
        let barrier = self.barrier.lock().unwrap().clone();
        Box::pin(async move {
            if let Some(barrier) = barrier {
                barrier.wait().await;
            }
            match behavior {
                Some(ConfirmBehavior::Ok(confirmed)) => Ok(confirmed),
                Some(ConfirmBehavior::NotFound) | None => {
                    Err(GatewayError::TransactionNotFound { reference })
                }
                Some(ConfirmBehavior::Unavailable) => Err(GatewayError::RequestStatus {
                    endpoint: format!("stub://verify/{reference}"),
                    status: reqwest::StatusCode::BAD_GATEWAY,
                }),
            }
        })
    }
}

/// Build an [`AppState`] wired to the given fakes.
pub async fn state_with(store: MemoryCatalogStore, gateway: Arc<StubGateway>) -> SharedState {
    let config = AppConfig {
        admin_key: "test-admin-key".into(),
        paystack_secret_key: "sk_test_secret".into(),
        app_url: "https://matchday.test".into(),
        currency: "GHS".into(),
    };
    let state = AppState::new(config, gateway);
    state.install_catalog_store(Arc::new(store)).await;
    state
}

/// A minimal purchasable game for test scenarios.
pub fn sample_game(price: &str) -> GameEntity {
    GameEntity {
        id: Uuid::new_v4(),
        name: "Midweek Special".into(),
        category: "vip".into(),
        price: price.parse().unwrap(),
        total_odds: "7.20".parse().unwrap(),
        secret: "BK-77-CODE".into(),
        matches: vec![MatchEntity {
            home_team: "Accra Lions".into(),
            away_team: "Bechem United".into(),
            league: "GPL".into(),
            odds: "1.95".parse().unwrap(),
            outcome: MatchOutcome::Pending,
        }],
        lifecycle: GameLifecycle::Active,
        kickoff_at: None,
        created_at: SystemTime::now(),
        updated_at: SystemTime::now(),
        archived_at: None,
    }
}
