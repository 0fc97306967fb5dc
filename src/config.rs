//! Application-level configuration loaded from the environment at startup.

use std::env;

use thiserror::Error;

/// Environment variable holding the shared admin key.
const ADMIN_KEY_ENV: &str = "ADMIN_KEY";
/// Environment variable holding the Paystack secret key.
const PAYSTACK_SECRET_KEY_ENV: &str = "PAYSTACK_SECRET_KEY";
/// Environment variable holding the public base URL of this deployment.
const APP_URL_ENV: &str = "APP_URL";
/// Environment variable overriding the charge currency.
const CURRENCY_ENV: &str = "CURRENCY";

/// Currency used when [`CURRENCY_ENV`] is not set.
const DEFAULT_CURRENCY: &str = "GHS";

/// Raised when a required configuration variable is absent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Shared secret expected in the `x-admin-key` header on admin routes.
    pub admin_key: String,
    /// Paystack secret key; doubles as the webhook signing key.
    pub paystack_secret_key: String,
    /// Public base URL of this deployment, without a trailing slash.
    pub app_url: String,
    /// ISO currency code charges are made in.
    pub currency: String,
}

impl AppConfig {
    /// Load the configuration from the environment.
    ///
    /// Unlike cosmetic settings, a missing payment or admin secret must
    /// refuse to boot rather than fall back to a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_key = require(ADMIN_KEY_ENV)?;
        let paystack_secret_key = require(PAYSTACK_SECRET_KEY_ENV)?;
        let app_url = require(APP_URL_ENV)?.trim_end_matches('/').to_owned();
        let currency =
            env::var(CURRENCY_ENV).unwrap_or_else(|_| DEFAULT_CURRENCY.to_owned());

        Ok(Self {
            admin_key,
            paystack_secret_key,
            app_url,
            currency,
        })
    }

    /// URL the payment provider redirects the customer back to.
    pub fn callback_url(&self) -> String {
        format!("{}/purchase/callback", self.app_url)
    }

    /// Frontend page the callback handler sends the customer to.
    pub fn purchases_page_url(&self) -> String {
        format!("{}/account/purchases", self.app_url)
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnvVar { var })
}
