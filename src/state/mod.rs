//! Shared application state: explicit handles to the storage backend, the
//! payment gateway, and the immutable configuration.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    dao::catalog_store::CatalogStore,
    error::ServiceError,
    gateway::PaymentGateway,
};

/// Cheaply clonable handle on [`AppState`].
pub type SharedState = Arc<AppState>;

/// Central application state holding the injected collaborators.
///
/// Both the store and the gateway are constructed once in `main` and
/// passed in here; nothing in the crate reaches for a module-level
/// singleton.
pub struct AppState {
    config: AppConfig,
    catalog_store: RwLock<Option<Arc<dyn CatalogStore>>>,
    gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, gateway: Arc<dyn PaymentGateway>) -> SharedState {
        Arc::new(Self {
            config,
            catalog_store: RwLock::new(None),
            gateway,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle on the payment gateway adapter.
    pub fn gateway(&self) -> Arc<dyn PaymentGateway> {
        self.gateway.clone()
    }

    /// Obtain a handle to the current catalog store, if one is installed.
    pub async fn catalog_store(&self) -> Option<Arc<dyn CatalogStore>> {
        let guard = self.catalog_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the catalog store or fail with the degraded-mode error.
    pub async fn require_catalog_store(&self) -> Result<Arc<dyn CatalogStore>, ServiceError> {
        self.catalog_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_catalog_store(&self, store: Arc<dyn CatalogStore>) {
        let mut guard = self.catalog_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_catalog_store(&self) {
        let mut guard = self.catalog_store.write().await;
        guard.take();
    }

    /// Whether the application currently lacks a storage backend.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.catalog_store.read().await;
        guard.is_none()
    }
}
