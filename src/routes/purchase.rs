//! Purchase flow routes: checkout initiation plus the three redundant
//! verification channels (redirect callback, provider webhook, client
//! poll). All three funnel into the same idempotent service call.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
};
use tracing::warn;
use validator::Validate;

use crate::{
    dto::purchase::{
        CallbackParams, InitiatePurchaseRequest, InitiatePurchaseResponse, PurchaseView,
        PurchasesResponse, VerifyPurchaseRequest, WebhookAck, WebhookEvent,
    },
    error::{AppError, ServiceError},
    gateway::signature::{SIGNATURE_HEADER, verify_signature},
    routes::CurrentUser,
    services::{entitlement_service, reconciliation},
    state::SharedState,
};

/// Webhook event type that carries a successful charge.
const CHARGE_SUCCESS_EVENT: &str = "charge.success";

/// Configure the purchase routes subtree.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/purchase/init", post(initiate_purchase))
        .route("/purchase/callback", get(purchase_callback))
        .route("/purchase/webhook", post(purchase_webhook))
        .route("/purchase/verify", post(verify_purchase))
        .route("/me/purchases", get(my_purchases))
}

/// Start a hosted-checkout transaction for a game.
#[utoipa::path(
    post,
    path = "/purchase/init",
    tag = "purchase",
    request_body = InitiatePurchaseRequest,
    responses(
        (status = 200, description = "Checkout created", body = InitiatePurchaseResponse),
        (status = 401, description = "Caller is not authenticated")
    )
)]
pub async fn initiate_purchase(
    State(state): State<SharedState>,
    user: CurrentUser,
    Json(payload): Json<InitiatePurchaseRequest>,
) -> Result<Json<InitiatePurchaseResponse>, AppError> {
    let response = reconciliation::initiate(&state, &user.id, &user.email, payload).await?;
    Ok(Json(response))
}

/// Map a verification failure onto the machine-readable reason code the
/// purchases page understands.
fn callback_error_code(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::PaymentRejected { .. } | ServiceError::NotFound(_) => "PaymentFailed",
        ServiceError::MissingMetadata { .. } => "BadMetadata",
        ServiceError::Unavailable(_) | ServiceError::Degraded => "DbError",
        _ => "ServerError",
    }
}

/// Redirect target for the provider's hosted checkout.
///
/// The redirect itself proves nothing; the handler re-verifies the
/// reference with the provider before the customer sees a success page.
#[utoipa::path(
    get,
    path = "/purchase/callback",
    tag = "purchase",
    params(("reference" = Option<String>, Query, description = "Provider transaction reference")),
    responses((status = 303, description = "Redirect to the purchases page with a success flag or reason code"))
)]
pub async fn purchase_callback(
    State(state): State<SharedState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let purchases_page = state.config().purchases_page_url();

    let Some(reference) = params.reference.filter(|value| !value.is_empty()) else {
        return Redirect::to(&format!("{purchases_page}?error=NoReference"));
    };

    match reconciliation::verify(&state, &reference).await {
        Ok(_) => Redirect::to(&format!("{purchases_page}?success=1")),
        Err(err) => {
            warn!(%reference, error = %err, "callback verification failed");
            Redirect::to(&format!(
                "{purchases_page}?error={}",
                callback_error_code(&err)
            ))
        }
    }
}

/// Provider webhook receiver.
///
/// The signature is recomputed over the raw body before anything is
/// parsed; a mismatch is a terminal rejection. Well-formed events that
/// can never succeed (failed charge, missing metadata) are acknowledged
/// with a rejection status so the provider does not retry them forever.
#[utoipa::path(
    post,
    path = "/purchase/webhook",
    tag = "purchase",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Event processed, ignored, or terminally rejected", body = WebhookAck),
        (status = 401, description = "Missing or invalid signature")
    )
)]
pub async fn purchase_webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing webhook signature header".into()))?;

    if !verify_signature(&state.config().paystack_secret_key, &body, signature) {
        return Err(AppError::Unauthorized("invalid webhook signature".into()));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|err| AppError::BadRequest(format!("malformed webhook payload: {err}")))?;

    if event.event != CHARGE_SUCCESS_EVENT {
        return Ok(Json(WebhookAck::ignored()));
    }

    let data = event
        .data
        .ok_or_else(|| AppError::BadRequest("webhook event carries no data".into()))?;

    match reconciliation::verify(&state, &data.reference).await {
        Ok(_) => Ok(Json(WebhookAck::processed())),
        Err(
            err @ (ServiceError::PaymentRejected { .. }
            | ServiceError::MissingMetadata { .. }
            | ServiceError::NotFound(_)),
        ) => {
            warn!(reference = %data.reference, error = %err, "webhook event terminally rejected");
            Ok(Json(WebhookAck::rejected()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Client-side verification poll.
///
/// The reference is the capability here: the success page fires this
/// after the checkout returns, and the provider-confirmed metadata (not
/// the session) decides who gets entitled.
#[utoipa::path(
    post,
    path = "/purchase/verify",
    tag = "purchase",
    request_body = VerifyPurchaseRequest,
    responses(
        (status = 200, description = "Purchase verified", body = PurchaseView),
        (status = 400, description = "Payment failed or carried no metadata")
    )
)]
pub async fn verify_purchase(
    State(state): State<SharedState>,
    Json(payload): Json<VerifyPurchaseRequest>,
) -> Result<Json<PurchaseView>, AppError> {
    payload.validate()?;
    let order = reconciliation::verify(&state, &payload.reference).await?;
    Ok(Json(PurchaseView::from_order(order, None)))
}

/// List the caller's confirmed purchases.
#[utoipa::path(
    get,
    path = "/me/purchases",
    tag = "purchase",
    responses(
        (status = 200, description = "Purchase history", body = PurchasesResponse),
        (status = 401, description = "Caller is not authenticated")
    )
)]
pub async fn my_purchases(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> Result<Json<PurchasesResponse>, AppError> {
    Ok(Json(
        entitlement_service::list_purchases(&state, &user.id).await?,
    ))
}
