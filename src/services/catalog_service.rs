//! Business logic powering the admin catalog routes: uploads, updates,
//! match settlement, archival, and the lazy retention sweep.

use std::time::{Duration, SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, GameLifecycle, MatchOutcome},
    dto::{
        admin::{AdminGameView, SetOutcomeRequest, UpdateGameRequest, UploadGameRequest},
        parse_rfc3339,
    },
    error::ServiceError,
    state::SharedState,
};

/// How long an archived game is kept before it may be permanently
/// deleted.
pub const ARCHIVE_RETENTION: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Whether an archived game has outlived the retention window at `now`.
///
/// Strictly-older-than: a game archived exactly `ARCHIVE_RETENTION` ago is
/// still kept.
pub fn eligible_for_purge(archived_at: SystemTime, now: SystemTime) -> bool {
    now.duration_since(archived_at)
        .map(|age| age > ARCHIVE_RETENTION)
        .unwrap_or(false)
}

fn parse_kickoff(raw: Option<String>) -> Result<Option<SystemTime>, ServiceError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_rfc3339(&value)
            .map(Some)
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("invalid RFC 3339 kickoff timestamp `{value}`"))
            }),
    }
}

/// Create a new game in the catalog.
pub async fn upload_game(
    state: &SharedState,
    request: UploadGameRequest,
) -> Result<AdminGameView, ServiceError> {
    let store = state.require_catalog_store().await?;
    let now = SystemTime::now();

    let game = GameEntity {
        id: Uuid::new_v4(),
        name: request.name,
        category: request.category,
        price: request.price,
        total_odds: request.total_odds,
        secret: request.secret,
        matches: request
            .matches
            .into_iter()
            .map(|entry| entry.into_entity())
            .collect(),
        lifecycle: GameLifecycle::Active,
        kickoff_at: parse_kickoff(request.kickoff_at)?,
        created_at: now,
        updated_at: now,
        archived_at: None,
    };

    store.save_game(game.clone()).await?;
    info!(game_id = %game.id, "uploaded game");

    Ok(AdminGameView::from_entity(game, 0))
}

/// Replace the mutable fields of an existing game.
pub async fn update_game(
    state: &SharedState,
    id: Uuid,
    request: UpdateGameRequest,
) -> Result<AdminGameView, ServiceError> {
    let store = state.require_catalog_store().await?;

    let mut game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;

    game.name = request.name;
    game.category = request.category;
    game.secret = request.secret;
    game.price = request.price;
    game.total_odds = request.total_odds;
    game.kickoff_at = parse_kickoff(request.kickoff_at)?;
    game.matches = request
        .matches
        .into_iter()
        .map(|entry| entry.into_entity())
        .collect();
    game.updated_at = SystemTime::now();

    store.save_game(game.clone()).await?;

    let purchases = store.count_orders_for_game(id).await?;
    Ok(AdminGameView::from_entity(game, purchases))
}

/// Settle a single match pick inside a game.
pub async fn set_match_outcome(
    state: &SharedState,
    id: Uuid,
    match_index: usize,
    request: SetOutcomeRequest,
) -> Result<AdminGameView, ServiceError> {
    let store = state.require_catalog_store().await?;

    let mut game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;

    let Some(entry) = game.matches.get_mut(match_index) else {
        return Err(ServiceError::InvalidInput(format!(
            "match index {match_index} out of bounds ({} matches)",
            game.matches.len()
        )));
    };

    entry.outcome = MatchOutcome::normalize(&request.outcome);
    game.updated_at = SystemTime::now();

    store.save_game(game.clone()).await?;

    let purchases = store.count_orders_for_game(id).await?;
    Ok(AdminGameView::from_entity(game, purchases))
}

/// Soft-delete a game: hide it from the public catalog and start the
/// retention clock.
pub async fn archive_game(state: &SharedState, id: Uuid) -> Result<AdminGameView, ServiceError> {
    let store = state.require_catalog_store().await?;

    let mut game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;

    if game.lifecycle == GameLifecycle::Archived {
        return Err(ServiceError::InvalidState(format!(
            "game `{id}` is already archived"
        )));
    }

    let now = SystemTime::now();
    game.lifecycle = GameLifecycle::Archived;
    game.archived_at = Some(now);
    game.updated_at = now;

    store.save_game(game.clone()).await?;
    info!(game_id = %id, "archived game");

    let purchases = store.count_orders_for_game(id).await?;
    Ok(AdminGameView::from_entity(game, purchases))
}

/// Undo an archival, putting the game back in the public catalog.
pub async fn restore_game(state: &SharedState, id: Uuid) -> Result<AdminGameView, ServiceError> {
    let store = state.require_catalog_store().await?;

    let mut game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;

    if game.lifecycle == GameLifecycle::Active {
        return Err(ServiceError::InvalidState(format!(
            "game `{id}` is not archived"
        )));
    }

    game.lifecycle = GameLifecycle::Active;
    game.archived_at = None;
    game.updated_at = SystemTime::now();

    store.save_game(game.clone()).await?;
    info!(game_id = %id, "restored game");

    let purchases = store.count_orders_for_game(id).await?;
    Ok(AdminGameView::from_entity(game, purchases))
}

/// Permanently delete a game.
pub async fn delete_game(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_catalog_store().await?;
    let deleted = store.delete_game(id).await?;
    if deleted {
        info!(game_id = %id, "permanently deleted game");
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("game `{id}` not found")))
    }
}

/// Return every game for administration, with ledger purchase counts.
pub async fn list_games(state: &SharedState) -> Result<Vec<AdminGameView>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let games = store.list_games(None).await?;

    let mut views = Vec::with_capacity(games.len());
    for game in games {
        let purchases = store.count_orders_for_game(game.id).await?;
        views.push(AdminGameView::from_entity(game, purchases));
    }

    Ok(views)
}

/// Return the archived games, sweeping out those past retention first.
///
/// The sweep is deliberately lazy: it runs as a side effect of this read
/// instead of a scheduled job, which is enough to uphold the contract
/// that expired archives do not persist indefinitely.
pub async fn list_archived_games(state: &SharedState) -> Result<Vec<AdminGameView>, ServiceError> {
    let store = state.require_catalog_store().await?;

    let cutoff = SystemTime::now() - ARCHIVE_RETENTION;
    let purged = store.purge_archived_before(cutoff).await?;
    if purged > 0 {
        info!(purged, "purged archived games past retention");
    }

    let games = store.list_games(Some(GameLifecycle::Archived)).await?;

    let mut views = Vec::with_capacity(games.len());
    for game in games {
        let purchases = store.count_orders_for_game(game.id).await?;
        views.push(AdminGameView::from_entity(game, purchases));
    }

    Ok(views)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::models::MatchOutcome,
        dto::admin::MatchInput,
        services::testing::{MemoryCatalogStore, StubGateway, sample_game, state_with},
    };

    fn upload_request() -> UploadGameRequest {
        UploadGameRequest {
            name: "Saturday Banker".into(),
            category: "correct score".into(),
            secret: "BK-NEW-1".into(),
            price: "15.00".parse().unwrap(),
            total_odds: "4.50".parse().unwrap(),
            kickoff_at: None,
            matches: vec![MatchInput {
                home_team: "Aduana Stars".into(),
                away_team: "Karela United".into(),
                league: "GPL".into(),
                odds: "2.25".parse().unwrap(),
                outcome: Some("WIN".into()),
            }],
        }
    }

    #[tokio::test]
    async fn upload_normalizes_match_outcomes() {
        let state = state_with(MemoryCatalogStore::new(), Arc::new(StubGateway::new())).await;

        let view = upload_game(&state, upload_request()).await.unwrap();

        assert_eq!(view.matches.len(), 1);
        assert_eq!(view.matches[0].outcome, MatchOutcome::Won);
        assert_eq!(view.purchase_count, 0);
    }

    #[tokio::test]
    async fn upload_rejects_malformed_kickoff() {
        let state = state_with(MemoryCatalogStore::new(), Arc::new(StubGateway::new())).await;

        let mut request = upload_request();
        request.kickoff_at = Some("next saturday".into());

        let result = upload_game(&state, request).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn set_outcome_checks_the_match_index() {
        let game = sample_game("10.00");
        let game_id = game.id;
        let state = state_with(
            MemoryCatalogStore::new().with_game(game),
            Arc::new(StubGateway::new()),
        )
        .await;

        let updated = set_match_outcome(
            &state,
            game_id,
            0,
            SetOutcomeRequest {
                outcome: "lost".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.matches[0].outcome, MatchOutcome::Lost);

        let result = set_match_outcome(
            &state,
            game_id,
            5,
            SetOutcomeRequest {
                outcome: "won".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn archive_then_restore_round_trips() {
        let game = sample_game("10.00");
        let game_id = game.id;
        let state = state_with(
            MemoryCatalogStore::new().with_game(game),
            Arc::new(StubGateway::new()),
        )
        .await;

        let archived = archive_game(&state, game_id).await.unwrap();
        assert_eq!(archived.lifecycle, GameLifecycle::Archived);
        assert!(archived.archived_at.is_some());

        // Archiving twice is a state error, not a silent no-op.
        assert!(matches!(
            archive_game(&state, game_id).await,
            Err(ServiceError::InvalidState(_))
        ));

        let restored = restore_game(&state, game_id).await.unwrap();
        assert_eq!(restored.lifecycle, GameLifecycle::Active);
        assert!(restored.archived_at.is_none());
    }

    #[test]
    fn retention_boundary_is_strict() {
        let now = SystemTime::now();
        let just_inside = now - (ARCHIVE_RETENTION - Duration::from_secs(1));
        let just_outside = now - (ARCHIVE_RETENTION + Duration::from_secs(1));
        let exactly = now - ARCHIVE_RETENTION;

        assert!(!eligible_for_purge(just_inside, now));
        assert!(eligible_for_purge(just_outside, now));
        assert!(!eligible_for_purge(exactly, now));
        // Clock skew producing a future archival time never purges.
        assert!(!eligible_for_purge(now + Duration::from_secs(60), now));
    }

    #[tokio::test]
    async fn archived_listing_sweeps_expired_games() {
        let now = SystemTime::now();

        let mut expired = sample_game("10.00");
        expired.lifecycle = GameLifecycle::Archived;
        expired.archived_at = Some(now - (ARCHIVE_RETENTION + Duration::from_secs(1)));

        let mut fresh = sample_game("10.00");
        fresh.name = "Fresh Archive".into();
        fresh.lifecycle = GameLifecycle::Archived;
        fresh.archived_at = Some(now - Duration::from_secs(60));
        let fresh_id = fresh.id;

        let store = MemoryCatalogStore::new().with_game(expired).with_game(fresh);
        let state = state_with(store, Arc::new(StubGateway::new())).await;

        let listed = list_archived_games(&state).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, fresh_id);
    }
}
