//! Public projections of the catalog.
//!
//! The unentitled projection deliberately omits the booking code, team
//! names, leagues, and per-pick odds: exposing any of those would leak
//! paid content. Only aggregate shape (pick count, outcome tallies) is
//! public.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, MatchOutcome},
    dto::{common::MatchView, format_system_time},
};

/// Catalog entry as seen by anyone, entitled or not.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicGame {
    pub id: Uuid,
    pub name: String,
    /// Masked display category, never the raw uploaded string.
    pub category: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub total_odds: Decimal,
    /// Number of picks in the bundle.
    pub match_count: usize,
    /// Picks already settled as won.
    pub won_count: usize,
    /// Picks already settled as lost.
    pub lost_count: usize,
    /// Picks still awaiting settlement.
    pub pending_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kickoff_at: Option<String>,
    pub created_at: String,
}

impl From<&GameEntity> for PublicGame {
    fn from(game: &GameEntity) -> Self {
        let tally = |outcome: MatchOutcome| {
            game.matches
                .iter()
                .filter(|entry| entry.outcome == outcome)
                .count()
        };

        Self {
            id: game.id,
            name: game.name.clone(),
            category: game.display_category(),
            price: game.price,
            total_odds: game.total_odds,
            match_count: game.matches.len(),
            won_count: tally(MatchOutcome::Won),
            lost_count: tally(MatchOutcome::Lost),
            pending_count: tally(MatchOutcome::Pending),
            kickoff_at: game.kickoff_at.map(format_system_time),
            created_at: format_system_time(game.created_at),
        }
    }
}

/// Paid content revealed once entitlement is established.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnlockedContent {
    /// Booking code for the bundle.
    pub secret: String,
    /// Full match list with teams, leagues, and odds.
    pub matches: Vec<MatchView>,
}

impl From<GameEntity> for UnlockedContent {
    fn from(game: GameEntity) -> Self {
        Self {
            secret: game.secret,
            matches: game.matches.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response for a single catalog entry; `unlocked` is present only when
/// the caller has access.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameDetailResponse {
    pub game: PublicGame,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked: Option<UnlockedContent>,
}

/// Response payload listing the active catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct GamesResponse {
    pub games: Vec<PublicGame>,
}
