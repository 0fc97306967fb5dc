use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Matchday Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::list_games,
        crate::routes::public::game_detail,
        crate::routes::purchase::initiate_purchase,
        crate::routes::purchase::purchase_callback,
        crate::routes::purchase::purchase_webhook,
        crate::routes::purchase::verify_purchase,
        crate::routes::purchase::my_purchases,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::public::GamesResponse,
            crate::dto::public::PublicGame,
            crate::dto::public::GameDetailResponse,
            crate::dto::public::UnlockedContent,
            crate::dto::common::MatchView,
            crate::dto::purchase::InitiatePurchaseRequest,
            crate::dto::purchase::InitiatePurchaseResponse,
            crate::dto::purchase::VerifyPurchaseRequest,
            crate::dto::purchase::PurchaseView,
            crate::dto::purchase::PurchasesResponse,
            crate::dto::purchase::WebhookAck,
            crate::dao::models::MatchOutcome,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Public catalog reads"),
        (name = "purchase", description = "Checkout and payment verification"),
    )
)]
pub struct ApiDoc;
