//! Entitlement queries: who may see a game's paid content, and a user's
//! purchase history.

use std::sync::Arc;

use crate::{
    dao::{catalog_store::CatalogStore, models::GameEntity},
    dto::purchase::{PurchaseView, PurchasesResponse},
    error::ServiceError,
    state::SharedState,
};

/// Whether the given caller may see the game's secret and full match
/// list.
///
/// Free games are accessible to everyone, including anonymous callers;
/// otherwise access requires a ledger entry linking the user to the game.
/// Pure read, safe to call on every catalog request.
pub async fn has_access(
    store: &Arc<dyn CatalogStore>,
    user_id: Option<&str>,
    game: &GameEntity,
) -> Result<bool, ServiceError> {
    if game.is_free() {
        return Ok(true);
    }

    let Some(user_id) = user_id else {
        return Ok(false);
    };

    let order = store
        .find_order_for_user_game(user_id.to_owned(), game.id)
        .await?;
    Ok(order.is_some())
}

/// The caller's confirmed purchases, newest first.
///
/// Each entry is joined with live game metadata when the game still
/// exists; otherwise the snapshot denormalized at purchase time keeps the
/// record meaningful.
pub async fn list_purchases(
    state: &SharedState,
    user_id: &str,
) -> Result<PurchasesResponse, ServiceError> {
    let store = state.require_catalog_store().await?;
    let orders = store.list_orders_for_user(user_id.to_owned()).await?;

    let mut purchases = Vec::with_capacity(orders.len());
    for order in orders {
        let game = store.find_game(order.game_id).await?;
        purchases.push(PurchaseView::from_order(order, game.as_ref()));
    }

    Ok(PurchasesResponse { purchases })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use uuid::Uuid;

    use super::*;
    use crate::{
        dao::models::OrderEntity,
        services::testing::{MemoryCatalogStore, StubGateway, sample_game, state_with},
    };

    fn paid_order(user_id: &str, game_id: Uuid, reference: &str) -> OrderEntity {
        OrderEntity {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            game_id,
            reference: reference.into(),
            amount: "25.00".parse().unwrap(),
            currency: "GHS".into(),
            game_name: "Midweek Special".into(),
            secret: "BK-77-CODE".into(),
            category: "vip".into(),
            created_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn free_games_are_accessible_without_any_ledger_entry() {
        let game = sample_game("0");
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());

        assert!(has_access(&store, Some("anyone"), &game).await.unwrap());
        assert!(has_access(&store, None, &game).await.unwrap());
    }

    #[tokio::test]
    async fn paid_games_require_a_ledger_entry() {
        let game = sample_game("25.00");
        let memory = MemoryCatalogStore::new().with_game(game.clone());
        memory
            .insert_order(paid_order("buyer", game.id, "ref-1"))
            .await
            .unwrap();
        let store: Arc<dyn CatalogStore> = Arc::new(memory);

        assert!(has_access(&store, Some("buyer"), &game).await.unwrap());
        assert!(!has_access(&store, Some("stranger"), &game).await.unwrap());
        assert!(!has_access(&store, None, &game).await.unwrap());
    }

    #[tokio::test]
    async fn purchase_history_falls_back_to_the_snapshot() {
        let game = sample_game("25.00");
        let game_id = game.id;
        let store = MemoryCatalogStore::new().with_game(game);
        store
            .insert_order(paid_order("buyer", game_id, "ref-live"))
            .await
            .unwrap();

        let orphan_game_id = Uuid::new_v4();
        let mut orphan = paid_order("buyer", orphan_game_id, "ref-orphan");
        orphan.game_name = "Deleted Bundle".into();
        orphan.secret = "BK-GONE".into();
        store.insert_order(orphan).await.unwrap();

        let state = state_with(store, Arc::new(StubGateway::new())).await;
        let response = list_purchases(&state, "buyer").await.unwrap();

        assert_eq!(response.purchases.len(), 2);

        let live = response
            .purchases
            .iter()
            .find(|p| p.game_id == game_id)
            .unwrap();
        assert_eq!(live.game_name, "Midweek Special");
        assert_eq!(live.secret, "BK-77-CODE");

        let orphaned = response
            .purchases
            .iter()
            .find(|p| p.game_id == orphan_game_id)
            .unwrap();
        assert_eq!(orphaned.game_name, "Deleted Bundle");
        assert_eq!(orphaned.secret, "BK-GONE");
    }
}
