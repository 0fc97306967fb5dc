use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::public::{GameDetailResponse, GamesResponse},
    error::AppError,
    routes::CurrentUser,
    services::public_service,
    state::SharedState,
};

/// Public catalog routes; no paid content crosses these handlers for
/// unentitled callers.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/{id}", get(game_detail))
}

/// List the active catalog in its public projection.
#[utoipa::path(
    get,
    path = "/games",
    tag = "catalog",
    responses((status = 200, description = "Active games", body = GamesResponse))
)]
pub async fn list_games(State(state): State<SharedState>) -> Result<Json<GamesResponse>, AppError> {
    Ok(Json(public_service::list_active_games(&state).await?))
}

/// Fetch one game; the booking code and full match list appear only for
/// entitled callers.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Identifier of the game to fetch")),
    responses((status = 200, description = "Game detail", body = GameDetailResponse))
)]
pub async fn game_detail(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDetailResponse>, AppError> {
    let user_id = user.as_ref().map(|user| user.id.as_str());
    Ok(Json(public_service::game_detail(&state, user_id, id).await?))
}
