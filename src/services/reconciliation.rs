//! Purchase initiation and idempotent payment verification.
//!
//! Three independent channels (redirect callback, provider webhook, and
//! the client poll) all converge on [`verify`] with nothing but a
//! transaction reference. The contract is at-least-once delivery with
//! at-most-once effect: however many times and from wherever a reference
//! arrives, the ledger ends up with exactly one row for it, and every
//! caller receives that same row.

use std::time::SystemTime;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::OrderEntity,
    dao::storage::StorageError,
    dto::purchase::{InitiatePurchaseRequest, InitiatePurchaseResponse},
    error::ServiceError,
    gateway::GatewayError,
    state::SharedState,
};

/// Start a hosted-checkout transaction for the given game.
///
/// The charge amount is always the price currently stored in the catalog;
/// a client-supplied amount is never accepted. The user and game
/// identifiers travel as provider-side metadata so that verification does
/// not depend on anything the client says later.
pub async fn initiate(
    state: &SharedState,
    user_id: &str,
    email: &str,
    request: InitiatePurchaseRequest,
) -> Result<InitiatePurchaseResponse, ServiceError> {
    let store = state.require_catalog_store().await?;

    let game = store
        .find_game(request.game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{}` not found", request.game_id)))?;

    if game.price <= Decimal::ZERO {
        return Err(ServiceError::InvalidInput(
            "game is freely accessible and cannot be purchased".into(),
        ));
    }

    let metadata = crate::gateway::TransactionMetadata {
        user_id: user_id.to_owned(),
        game_id: game.id,
    };

    let initiated = state
        .gateway()
        .create_transaction(
            email.to_owned(),
            game.price,
            metadata,
            state.config().callback_url(),
        )
        .await
        .map_err(ServiceError::Gateway)?;

    info!(
        game_id = %game.id,
        reference = %initiated.reference,
        "initiated checkout transaction"
    );

    Ok(InitiatePurchaseResponse {
        authorization_url: initiated.authorization_url,
        reference: initiated.reference,
    })
}

/// Verify a transaction reference and record the entitlement.
///
/// Safe under concurrent and duplicate invocation: the ledger is checked
/// first, the provider is treated as the only authority on payment state,
/// and the storage layer's unique constraint on the reference arbitrates
/// races between notification channels.
pub async fn verify(state: &SharedState, reference: &str) -> Result<OrderEntity, ServiceError> {
    let store = state.require_catalog_store().await?;

    // Duplicate-suppression fast path: a recorded reference is terminal.
    if let Some(existing) = store.find_order_by_reference(reference.to_owned()).await? {
        return Ok(existing);
    }

    let confirmed = state
        .gateway()
        .confirm_transaction(reference.to_owned())
        .await
        .map_err(|err| match err {
            GatewayError::TransactionNotFound { reference } => {
                ServiceError::NotFound(format!("transaction `{reference}` not found"))
            }
            other => ServiceError::Gateway(other),
        })?;

    if !confirmed.success {
        return Err(ServiceError::PaymentRejected {
            reference: reference.to_owned(),
        });
    }

    let Some(metadata) = confirmed.metadata else {
        // A confirmed charge with no purchase context cannot be attributed
        // to anyone; refusing is the only safe option.
        warn!(%reference, "confirmed transaction carries no metadata");
        return Err(ServiceError::MissingMetadata {
            reference: reference.to_owned(),
        });
    };

    let game = store
        .find_game(metadata.game_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("game `{}` not found", metadata.game_id))
        })?;

    let order = OrderEntity {
        id: Uuid::new_v4(),
        user_id: metadata.user_id,
        game_id: game.id,
        reference: reference.to_owned(),
        amount: confirmed.amount,
        currency: state.config().currency.clone(),
        game_name: game.name,
        secret: game.secret,
        category: game.category,
        created_at: SystemTime::now(),
    };

    match store.insert_order(order.clone()).await {
        Ok(()) => {
            info!(
                reference,
                game_id = %order.game_id,
                "recorded entitlement"
            );
            Ok(order)
        }
        Err(StorageError::Conflict { .. }) => {
            // Another notification channel won the race; the stored row is
            // the authoritative one.
            store
                .find_order_by_reference(reference.to_owned())
                .await?
                .ok_or_else(|| {
                    ServiceError::InvalidState(format!(
                        "order for `{reference}` vanished after conflict"
                    ))
                })
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use super::*;
    use crate::{
        dto::purchase::InitiatePurchaseRequest,
        gateway::{ConfirmedTransaction, TransactionMetadata},
        services::testing::{ConfirmBehavior, MemoryCatalogStore, StubGateway, sample_game, state_with},
    };

    #[tokio::test]
    async fn initiate_charges_the_stored_price() {
        let game = sample_game("25.00");
        let game_id = game.id;
        let gateway = Arc::new(StubGateway::new());
        let state = state_with(MemoryCatalogStore::new().with_game(game), gateway.clone()).await;

        let response = initiate(
            &state,
            "user-1",
            "buyer@example.com",
            InitiatePurchaseRequest { game_id },
        )
        .await
        .unwrap();

        assert!(!response.reference.is_empty());
        assert!(response.authorization_url.starts_with("https://"));

        let calls = gateway.initiated_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].amount, "25.00".parse().unwrap());
        assert_eq!(calls[0].email, "buyer@example.com");
        assert_eq!(calls[0].metadata.user_id, "user-1");
        assert_eq!(calls[0].metadata.game_id, game_id);
        assert!(calls[0].callback_url.ends_with("/purchase/callback"));
    }

    #[tokio::test]
    async fn initiate_rejects_free_games() {
        let game = sample_game("0");
        let game_id = game.id;
        let gateway = Arc::new(StubGateway::new());
        let state = state_with(MemoryCatalogStore::new().with_game(game), gateway.clone()).await;

        let result = initiate(
            &state,
            "user-1",
            "buyer@example.com",
            InitiatePurchaseRequest { game_id },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        assert!(gateway.initiated_calls().is_empty());
    }

    #[tokio::test]
    async fn initiate_rejects_unknown_games() {
        let gateway = Arc::new(StubGateway::new());
        let state = state_with(MemoryCatalogStore::new(), gateway).await;

        let result = initiate(
            &state,
            "user-1",
            "buyer@example.com",
            InitiatePurchaseRequest {
                game_id: Uuid::new_v4(),
            },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn verify_records_once_then_returns_the_same_row() {
        let game = sample_game("25.00");
        let game_id = game.id;
        let store = MemoryCatalogStore::new().with_game(game);
        let gateway = Arc::new(StubGateway::new());
        gateway.confirm_success(
            "ref-1",
            "25.00".parse().unwrap(),
            TransactionMetadata {
                user_id: "user-1".into(),
                game_id,
            },
        );
        let state = state_with(store.clone(), gateway).await;

        let first = verify(&state, "ref-1").await.unwrap();
        let second = verify(&state, "ref-1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.secret, "BK-77-CODE");
        assert_eq!(store.orders().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_verifications_converge_on_one_row() {
        let game = sample_game("25.00");
        let game_id = game.id;
        let store = MemoryCatalogStore::new().with_game(game);
        let gateway = Arc::new(StubGateway::new());
        gateway.confirm_success(
            "ref-race",
            "25.00".parse().unwrap(),
            TransactionMetadata {
                user_id: "user-1".into(),
                game_id,
            },
        );
        // Hold both verifications at the provider-confirm step so neither
        // sees the other's ledger row in the fast path.
        gateway.set_barrier(Arc::new(Barrier::new(2)));
        let state = state_with(store.clone(), gateway).await;

        let (left, right) = tokio::join!(verify(&state, "ref-race"), verify(&state, "ref-race"));

        let left = left.unwrap();
        let right = right.unwrap();
        assert_eq!(left.id, right.id);
        assert_eq!(store.orders().len(), 1);
    }

    #[tokio::test]
    async fn verify_rejects_unsuccessful_payments() {
        let game = sample_game("25.00");
        let store = MemoryCatalogStore::new().with_game(game);
        let gateway = Arc::new(StubGateway::new());
        gateway.script_confirm(
            "ref-failed",
            ConfirmBehavior::Ok(ConfirmedTransaction {
                success: false,
                amount: "25.00".parse().unwrap(),
                metadata: None,
                customer_email: None,
            }),
        );
        let state = state_with(store.clone(), gateway).await;

        let result = verify(&state, "ref-failed").await;

        assert!(matches!(
            result,
            Err(ServiceError::PaymentRejected { .. })
        ));
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn verify_fails_closed_without_metadata() {
        let game = sample_game("25.00");
        let store = MemoryCatalogStore::new().with_game(game);
        let gateway = Arc::new(StubGateway::new());
        gateway.script_confirm(
            "ref-nometa",
            ConfirmBehavior::Ok(ConfirmedTransaction {
                success: true,
                amount: "25.00".parse().unwrap(),
                metadata: None,
                customer_email: None,
            }),
        );
        let state = state_with(store.clone(), gateway).await;

        let result = verify(&state, "ref-nometa").await;

        assert!(matches!(
            result,
            Err(ServiceError::MissingMetadata { .. })
        ));
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn verify_surfaces_unknown_references() {
        let gateway = Arc::new(StubGateway::new());
        gateway.script_confirm("ref-missing", ConfirmBehavior::NotFound);
        let state = state_with(MemoryCatalogStore::new(), gateway).await;

        let result = verify(&state, "ref-missing").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn verify_surfaces_gateway_outages() {
        let store = MemoryCatalogStore::new();
        let gateway = Arc::new(StubGateway::new());
        gateway.script_confirm("ref-down", ConfirmBehavior::Unavailable);
        let state = state_with(store.clone(), gateway).await;

        let result = verify(&state, "ref-down").await;

        assert!(matches!(result, Err(ServiceError::Gateway(_))));
        assert!(store.orders().is_empty());
    }
}
