//! Paystack implementation of the payment gateway boundary.
//!
//! Paystack quotes amounts in minor currency units (pesewas); this module
//! is the only place in the crate where the conversion to and from the
//! decimal major-unit representation happens.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::{
    ConfirmedTransaction, GatewayError, GatewayResult, InitiatedTransaction, PaymentGateway,
    TransactionMetadata,
};

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Runtime configuration describing how to reach Paystack.
#[derive(Debug, Clone)]
pub struct PaystackConfig {
    pub secret_key: String,
    pub base_url: String,
}

impl PaystackConfig {
    /// Construct a configuration for the production Paystack API.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Point the client at a different base URL (test doubles, sandboxes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// HTTP client wrapping Paystack's initialize/verify operations.
#[derive(Clone)]
pub struct PaystackGateway {
    client: Client,
    base_url: Arc<str>,
    secret_key: Arc<str>,
}

#[derive(Debug, Serialize)]
struct InitializeRequest {
    email: String,
    /// Amount in minor units.
    amount: u64,
    metadata: TransactionMetadata,
    callback_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    /// Amount in minor units.
    amount: u64,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
    #[serde(default)]
    customer: Option<CustomerData>,
}

#[derive(Debug, Deserialize)]
struct CustomerData {
    #[serde(default)]
    email: Option<String>,
}

impl PaystackGateway {
    /// Build the HTTP client for the configured Paystack endpoint.
    pub fn new(config: PaystackConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| GatewayError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            secret_key: Arc::<str>::from(config.secret_key),
        })
    }

    async fn initialize(
        &self,
        email: String,
        amount: Decimal,
        metadata: TransactionMetadata,
        callback_url: String,
    ) -> GatewayResult<InitiatedTransaction> {
        let endpoint = format!("{}/transaction/initialize", self.base_url);
        let body = InitializeRequest {
            email,
            amount: to_minor_units(amount)?,
            metadata,
            callback_url,
        };

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(self.secret_key.as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|source| GatewayError::RequestSend {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::RequestStatus { endpoint, status });
        }

        let envelope: Envelope<InitializeData> =
            response
                .json()
                .await
                .map_err(|source| GatewayError::DecodeResponse {
                    endpoint: endpoint.clone(),
                    source,
                })?;

        let data = match envelope {
            Envelope {
                status: true,
                data: Some(data),
                ..
            } => data,
            Envelope { message, .. } => {
                return Err(GatewayError::Rejected { endpoint, message });
            }
        };

        Ok(InitiatedTransaction {
            reference: data.reference,
            authorization_url: data.authorization_url,
        })
    }

    async fn verify(&self, reference: String) -> GatewayResult<ConfirmedTransaction> {
        let endpoint = format!("{}/transaction/verify/{}", self.base_url, reference);

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(self.secret_key.as_ref())
            .send()
            .await
            .map_err(|source| GatewayError::RequestSend {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::TransactionNotFound { reference });
        }
        if !status.is_success() {
            return Err(GatewayError::RequestStatus { endpoint, status });
        }

        let envelope: Envelope<VerifyData> =
            response
                .json()
                .await
                .map_err(|source| GatewayError::DecodeResponse {
                    endpoint: endpoint.clone(),
                    source,
                })?;

        let data = match envelope {
            Envelope {
                status: true,
                data: Some(data),
                ..
            } => data,
            Envelope { message, .. } => {
                return Err(GatewayError::Rejected { endpoint, message });
            }
        };

        Ok(ConfirmedTransaction {
            success: data.status == "success",
            amount: from_minor_units(data.amount),
            metadata: TransactionMetadata::from_value(data.metadata.as_ref()),
            customer_email: data.customer.and_then(|customer| customer.email),
        })
    }
}

impl PaymentGateway for PaystackGateway {
    fn create_transaction(
        &self,
        email: String,
        amount: Decimal,
        metadata: TransactionMetadata,
        callback_url: String,
    ) -> BoxFuture<'static, GatewayResult<InitiatedTransaction>> {
        let gateway = self.clone();
        Box::pin(async move {
            gateway
                .initialize(email, amount, metadata, callback_url)
                .await
        })
    }

    fn confirm_transaction(
        &self,
        reference: String,
    ) -> BoxFuture<'static, GatewayResult<ConfirmedTransaction>> {
        let gateway = self.clone();
        Box::pin(async move { gateway.verify(reference).await })
    }
}

/// Convert a major-unit decimal amount into the provider's minor units.
///
/// Amounts with sub-minor precision (fractions of a pesewa) or negative
/// values cannot be charged and are rejected.
pub fn to_minor_units(amount: Decimal) -> GatewayResult<u64> {
    let minor = amount * Decimal::ONE_HUNDRED;
    if !minor.fract().is_zero() {
        return Err(GatewayError::InvalidAmount { amount });
    }
    minor
        .to_u64()
        .ok_or(GatewayError::InvalidAmount { amount })
}

/// Convert the provider's minor units back into a major-unit decimal.
pub fn from_minor_units(minor: u64) -> Decimal {
    Decimal::from(minor) / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_amounts_convert_to_minor_units() {
        let amount: Decimal = "25.00".parse().unwrap();
        assert_eq!(to_minor_units(amount).unwrap(), 2_500);

        let amount: Decimal = "0.01".parse().unwrap();
        assert_eq!(to_minor_units(amount).unwrap(), 1);

        let amount: Decimal = "10".parse().unwrap();
        assert_eq!(to_minor_units(amount).unwrap(), 1_000);
    }

    #[test]
    fn sub_minor_precision_is_rejected() {
        let amount: Decimal = "0.005".parse().unwrap();
        assert!(matches!(
            to_minor_units(amount),
            Err(GatewayError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let amount: Decimal = "-1.00".parse().unwrap();
        assert!(matches!(
            to_minor_units(amount),
            Err(GatewayError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn minor_units_round_trip() {
        let amount: Decimal = "199.99".parse().unwrap();
        assert_eq!(from_minor_units(to_minor_units(amount).unwrap()), amount);
        assert_eq!(from_minor_units(2_500), "25.00".parse::<Decimal>().unwrap());
    }
}
