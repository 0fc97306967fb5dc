/// Admin catalog management operations.
pub mod catalog_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Entitlement queries and purchase history.
pub mod entitlement_service;
/// Health check service.
pub mod health_service;
/// Public read-only catalog projections.
pub mod public_service;
/// Purchase initiation and idempotent payment verification.
pub mod reconciliation;
/// Storage connection supervisor with degraded-mode handling.
pub mod storage_supervisor;

#[cfg(test)]
pub(crate) mod testing;
