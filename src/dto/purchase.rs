//! DTOs for the purchase and verification flow.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, OrderEntity, display_category},
    dto::format_system_time,
};

/// Request to start a hosted-checkout transaction for a game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiatePurchaseRequest {
    pub game_id: Uuid,
}

/// Hosted checkout handle returned by a successful initiation.
#[derive(Debug, Serialize, ToSchema)]
pub struct InitiatePurchaseResponse {
    /// URL the customer is redirected to for payment.
    pub authorization_url: String,
    /// Provider reference identifying this payment attempt.
    pub reference: String,
}

/// Client-poll verification request.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VerifyPurchaseRequest {
    #[validate(length(min = 1, message = "transaction reference must not be empty"))]
    pub reference: String,
}

/// Query parameters of the provider redirect callback.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackParams {
    #[serde(default)]
    pub reference: Option<String>,
}

/// A confirmed purchase as shown in the customer's history.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseView {
    pub id: Uuid,
    pub game_id: Uuid,
    pub reference: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub currency: String,
    pub game_name: String,
    /// Masked display category.
    pub category: String,
    /// Booking code; the buyer is entitled by definition.
    pub secret: String,
    pub created_at: String,
}

impl PurchaseView {
    /// Project a ledger entry, preferring live game metadata and falling
    /// back to the snapshot denormalized at purchase time.
    pub fn from_order(order: OrderEntity, game: Option<&GameEntity>) -> Self {
        let (game_name, category, secret) = match game {
            Some(game) => (
                game.name.clone(),
                game.display_category(),
                game.secret.clone(),
            ),
            None => (
                order.game_name.clone(),
                display_category(&order.category),
                order.secret.clone(),
            ),
        };

        Self {
            id: order.id,
            game_id: order.game_id,
            reference: order.reference,
            amount: order.amount,
            currency: order.currency,
            game_name,
            category,
            secret,
            created_at: format_system_time(order.created_at),
        }
    }
}

/// Response payload listing the customer's confirmed purchases.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchasesResponse {
    pub purchases: Vec<PurchaseView>,
}

/// Webhook event envelope as delivered by the provider.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookEvent {
    /// Event discriminator, e.g. `charge.success`.
    pub event: String,
    #[serde(default)]
    pub data: Option<WebhookEventData>,
}

/// Payload of a webhook event; only the reference is consumed, the
/// authoritative state is re-fetched from the provider.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookEventData {
    pub reference: String,
}

/// Acknowledgement returned to the webhook sender.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    /// Event was verified and recorded.
    pub fn processed() -> Self {
        Self {
            status: "processed".into(),
        }
    }

    /// Event type is not relevant to entitlements.
    pub fn ignored() -> Self {
        Self {
            status: "ignored".into(),
        }
    }

    /// Event was well-formed but terminally unprocessable; acknowledged
    /// so the provider stops retrying it.
    pub fn rejected() -> Self {
        Self {
            status: "rejected".into(),
        }
    }
}
