use axum::{Router, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, state::SharedState};

pub mod admin;
pub mod docs;
pub mod health;
pub mod public;
pub mod purchase;

/// Header carrying the authenticated user identifier, injected by the
/// upstream auth layer.
const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's email address.
const USER_EMAIL_HEADER: &str = "x-user-email";

/// Identity of the authenticated caller, as asserted by the upstream
/// auth layer. Session handling itself lives outside this service.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Opaque stable user identifier.
    pub id: String,
    /// Email the payment provider charges against.
    pub email: String,
}

fn extract_user(parts: &Parts) -> Option<CurrentUser> {
    let id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())?
        .to_owned();
    let email = parts
        .headers
        .get(USER_EMAIL_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())?
        .to_owned();
    Some(CurrentUser { id, email })
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_user(parts).ok_or_else(|| {
            AppError::Unauthorized("missing authenticated user headers".into())
        })
    }
}

impl<S> axum::extract::OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_user(parts))
    }
}

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(public::router())
        .merge(purchase::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
