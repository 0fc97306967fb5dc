//! DTO definitions used by the admin REST API and documentation layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GameLifecycle, MatchEntity, MatchOutcome},
    dto::{common::MatchView, format_system_time, validation::validate_money},
};

/// Incoming match pick definition for game uploads and updates.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct MatchInput {
    #[validate(length(min = 1, message = "home team must not be empty"))]
    pub home_team: String,
    #[validate(length(min = 1, message = "away team must not be empty"))]
    pub away_team: String,
    #[serde(default)]
    pub league: String,
    #[validate(custom(function = validate_money))]
    #[schema(value_type = String)]
    pub odds: Decimal,
    /// Free-form outcome string; normalized into the closed outcome set.
    #[serde(default)]
    pub outcome: Option<String>,
}

impl MatchInput {
    /// Convert the input into a persisted match entity, normalizing the
    /// outcome string.
    pub fn into_entity(self) -> MatchEntity {
        MatchEntity {
            home_team: self.home_team,
            away_team: self.away_team,
            league: self.league,
            odds: self.odds,
            outcome: self
                .outcome
                .as_deref()
                .map(MatchOutcome::normalize)
                .unwrap_or_default(),
        }
    }
}

/// Payload to create a new game in the catalog.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UploadGameRequest {
    #[validate(length(min = 1, message = "game name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Booking code unlocked on purchase.
    #[validate(length(min = 1, message = "booking code must not be empty"))]
    pub secret: String,
    #[validate(custom(function = validate_money))]
    #[schema(value_type = String)]
    pub price: Decimal,
    #[validate(custom(function = validate_money))]
    #[schema(value_type = String)]
    #[serde(default)]
    pub total_odds: Decimal,
    /// RFC 3339 kickoff timestamp, if known.
    #[serde(default)]
    pub kickoff_at: Option<String>,
    #[validate(length(min = 1, message = "at least one match is required"), nested)]
    pub matches: Vec<MatchInput>,
}

/// Payload to replace the mutable fields of an existing game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, message = "game name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[validate(length(min = 1, message = "booking code must not be empty"))]
    pub secret: String,
    #[validate(custom(function = validate_money))]
    #[schema(value_type = String)]
    pub price: Decimal,
    #[validate(custom(function = validate_money))]
    #[schema(value_type = String)]
    #[serde(default)]
    pub total_odds: Decimal,
    #[serde(default)]
    pub kickoff_at: Option<String>,
    #[validate(length(min = 1, message = "at least one match is required"), nested)]
    pub matches: Vec<MatchInput>,
}

/// Request to settle a single match pick inside a game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetOutcomeRequest {
    /// Free-form outcome string; normalized into the closed outcome set.
    pub outcome: String,
}

/// Full projection of a game for administrators, including the secret and
/// the ledger-derived purchase count.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminGameView {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub total_odds: Decimal,
    pub secret: String,
    pub matches: Vec<MatchView>,
    pub lifecycle: GameLifecycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kickoff_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
    pub purchase_count: u64,
}

impl AdminGameView {
    /// Project a stored game together with its ledger purchase count.
    pub fn from_entity(game: GameEntity, purchase_count: u64) -> Self {
        Self {
            id: game.id,
            name: game.name,
            category: game.category,
            price: game.price,
            total_odds: game.total_odds,
            secret: game.secret,
            matches: game.matches.into_iter().map(Into::into).collect(),
            lifecycle: game.lifecycle,
            kickoff_at: game.kickoff_at.map(format_system_time),
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
            archived_at: game.archived_at.map(format_system_time),
            purchase_count,
        }
    }
}
