use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::admin::{AdminGameView, SetOutcomeRequest, UpdateGameRequest, UploadGameRequest},
    error::AppError,
    services::catalog_service,
    state::SharedState,
};

const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Admin-only management endpoints for the game catalog.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/games", get(list_games).post(upload_game))
        .route("/admin/games/archived", get(list_archived_games))
        .route("/admin/games/{id}", put(update_game).delete(delete_game))
        .route("/admin/games/{id}/archive", post(archive_game))
        .route("/admin/games/{id}/restore", post(restore_game))
        .route(
            "/admin/games/{id}/matches/{index}/outcome",
            post(set_match_outcome),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin_key))
}

/// Retrieve all games with their ledger purchase counts.
#[utoipa::path(
    get,
    path = "/admin/games",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key")),
    responses((status = 200, description = "All games", body = [AdminGameView]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AdminGameView>>, AppError> {
    Ok(Json(catalog_service::list_games(&state).await?))
}

/// Upload a new game to the catalog.
#[utoipa::path(
    post,
    path = "/admin/games",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key")),
    request_body = UploadGameRequest,
    responses((status = 200, description = "Game created", body = AdminGameView))
)]
pub async fn upload_game(
    State(state): State<SharedState>,
    Json(payload): Json<UploadGameRequest>,
) -> Result<Json<AdminGameView>, AppError> {
    payload.validate()?;
    Ok(Json(catalog_service::upload_game(&state, payload).await?))
}

/// Retrieve archived games, sweeping out those past retention first.
#[utoipa::path(
    get,
    path = "/admin/games/archived",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key")),
    responses((status = 200, description = "Archived games", body = [AdminGameView]))
)]
pub async fn list_archived_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AdminGameView>>, AppError> {
    Ok(Json(catalog_service::list_archived_games(&state).await?))
}

/// Replace the mutable fields of a game.
#[utoipa::path(
    put,
    path = "/admin/games/{id}",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key"),
    ("id" = String, Path, description = "Identifier of the game to update")),
    request_body = UpdateGameRequest,
    responses((status = 200, description = "Game updated", body = AdminGameView))
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGameRequest>,
) -> Result<Json<AdminGameView>, AppError> {
    payload.validate()?;
    Ok(Json(catalog_service::update_game(&state, id, payload).await?))
}

/// Permanently delete a game.
#[utoipa::path(
    delete,
    path = "/admin/games/{id}",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key"),
    ("id" = String, Path, description = "Identifier of the game to delete")),
    responses((status = 204, description = "Game deleted"))
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    catalog_service::delete_game(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Archive a game, hiding it from the public catalog.
#[utoipa::path(
    post,
    path = "/admin/games/{id}/archive",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key"),
    ("id" = String, Path, description = "Identifier of the game to archive")),
    responses((status = 200, description = "Game archived", body = AdminGameView))
)]
pub async fn archive_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminGameView>, AppError> {
    Ok(Json(catalog_service::archive_game(&state, id).await?))
}

/// Restore an archived game into the public catalog.
#[utoipa::path(
    post,
    path = "/admin/games/{id}/restore",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key"),
    ("id" = String, Path, description = "Identifier of the game to restore")),
    responses((status = 200, description = "Game restored", body = AdminGameView))
)]
pub async fn restore_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminGameView>, AppError> {
    Ok(Json(catalog_service::restore_game(&state, id).await?))
}

/// Settle one match pick inside a game.
#[utoipa::path(
    post,
    path = "/admin/games/{id}/matches/{index}/outcome",
    tag = "admin",
    params(("X-Admin-Key" = String, Header, description = "Shared admin key"),
    ("id" = String, Path, description = "Identifier of the game"),
    ("index" = usize, Path, description = "Zero-based match index")),
    request_body = SetOutcomeRequest,
    responses((status = 200, description = "Outcome updated", body = AdminGameView))
)]
pub async fn set_match_outcome(
    State(state): State<SharedState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<SetOutcomeRequest>,
) -> Result<Json<AdminGameView>, AppError> {
    Ok(Json(
        catalog_service::set_match_outcome(&state, id, index, payload).await?,
    ))
}

async fn require_admin_key(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing admin key header `X-Admin-Key`".into()))?;

    if provided == state.config().admin_key {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin key".into()))
    }
}
