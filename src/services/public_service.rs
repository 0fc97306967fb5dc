//! Service helpers that expose read-only public projections of the
//! catalog, gating paid content behind the entitlement query.

use uuid::Uuid;

use crate::{
    dao::models::GameLifecycle,
    dto::public::{GameDetailResponse, GamesResponse, PublicGame, UnlockedContent},
    error::ServiceError,
    services::entitlement_service,
    state::SharedState,
};

/// Return the active catalog in its public (masked) projection.
pub async fn list_active_games(state: &SharedState) -> Result<GamesResponse, ServiceError> {
    let store = state.require_catalog_store().await?;
    let games = store.list_games(Some(GameLifecycle::Active)).await?;

    Ok(GamesResponse {
        games: games.iter().map(PublicGame::from).collect(),
    })
}

/// Return a single game, including paid content only when the caller has
/// access to it.
pub async fn game_detail(
    state: &SharedState,
    user_id: Option<&str>,
    id: Uuid,
) -> Result<GameDetailResponse, ServiceError> {
    let store = state.require_catalog_store().await?;

    let game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;

    let entitled = entitlement_service::has_access(&store, user_id, &game).await?;

    let public = PublicGame::from(&game);
    let unlocked = entitled.then(|| UnlockedContent::from(game));

    Ok(GameDetailResponse {
        game: public,
        unlocked,
    })
}
