//! Payment gateway boundary: the trait the reconciliation service talks
//! to, plus the wire-level Paystack implementation.

pub mod paystack;
pub mod signature;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`GatewayError`] failures.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures that can occur while talking to the payment provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build payment gateway client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a provider endpoint could not be sent.
    #[error("failed to send gateway request to `{endpoint}`")]
    RequestSend {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The provider returned an unexpected status code.
    #[error("unexpected gateway response status {status} for `{endpoint}`")]
    RequestStatus { endpoint: String, status: StatusCode },
    /// Response payload could not be parsed into the expected shape.
    #[error("failed to decode gateway response for `{endpoint}`")]
    DecodeResponse {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The provider rejected the request at the envelope level.
    #[error("gateway rejected request to `{endpoint}`: {message}")]
    Rejected { endpoint: String, message: String },
    /// The provider does not know the transaction reference.
    #[error("transaction `{reference}` not found at the gateway")]
    TransactionNotFound { reference: String },
    /// The amount cannot be represented in the provider's minor units.
    #[error("amount `{amount}` cannot be converted to minor currency units")]
    InvalidAmount { amount: Decimal },
}

/// Purchase context embedded on the provider side when a transaction is
/// created, and read back on verification.
///
/// Verification must never depend on client-supplied identifiers, so this
/// is the only channel through which the user/game pair travels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionMetadata {
    pub user_id: String,
    pub game_id: Uuid,
}

impl TransactionMetadata {
    /// Leniently extract metadata from the provider's echo of it.
    ///
    /// Providers serialize unset metadata as `null`, an empty string, or
    /// an empty object; all of those yield `None` so the caller can fail
    /// closed.
    pub fn from_value(value: Option<&serde_json::Value>) -> Option<Self> {
        let object = value?.as_object()?;
        let user_id = object.get("user_id")?.as_str()?.to_owned();
        let game_id = object.get("game_id")?.as_str()?.parse().ok()?;
        if user_id.is_empty() {
            return None;
        }
        Some(Self { user_id, game_id })
    }
}

/// Outcome of creating a provider-side transaction.
#[derive(Debug, Clone)]
pub struct InitiatedTransaction {
    /// Provider-issued reference for this payment attempt.
    pub reference: String,
    /// Hosted checkout URL the user is redirected to.
    pub authorization_url: String,
}

/// Authoritative transaction state as reported by the provider.
#[derive(Debug, Clone)]
pub struct ConfirmedTransaction {
    /// Whether the provider reports the charge as successful.
    pub success: bool,
    /// Charged amount in major currency units.
    pub amount: Decimal,
    /// Echoed purchase context, if the transaction carried any.
    pub metadata: Option<TransactionMetadata>,
    /// Customer email attached to the charge.
    pub customer_email: Option<String>,
}

/// Thin client over the payment provider's hosted checkout API.
///
/// Implementations perform no retries; transient failures surface to the
/// caller unchanged.
pub trait PaymentGateway: Send + Sync {
    fn create_transaction(
        &self,
        email: String,
        amount: Decimal,
        metadata: TransactionMetadata,
        callback_url: String,
    ) -> BoxFuture<'static, GatewayResult<InitiatedTransaction>>;

    fn confirm_transaction(
        &self,
        reference: String,
    ) -> BoxFuture<'static, GatewayResult<ConfirmedTransaction>>;
}
