use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Outcome of a single match pick.
///
/// Raw strings coming from admin uploads or legacy rows are free-form;
/// [`MatchOutcome::normalize`] folds them into this closed set on every
/// write so read paths never see arbitrary casing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    /// Match has not been settled yet.
    Pending,
    /// Pick came in.
    Won,
    /// Pick missed.
    Lost,
}

impl MatchOutcome {
    /// Fold a free-form outcome string into the closed outcome set.
    ///
    /// Unknown or empty strings map to [`MatchOutcome::Pending`] rather
    /// than failing the write.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "won" | "win" => MatchOutcome::Won,
            "lost" | "lose" | "loss" => MatchOutcome::Lost,
            _ => MatchOutcome::Pending,
        }
    }
}

impl Default for MatchOutcome {
    fn default() -> Self {
        MatchOutcome::Pending
    }
}

/// A single match pick inside a game bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Home team display name.
    pub home_team: String,
    /// Away team display name.
    pub away_team: String,
    /// Competition the fixture belongs to.
    pub league: String,
    /// Odds quoted for this pick.
    pub odds: Decimal,
    /// Settlement state of the pick.
    #[serde(default)]
    pub outcome: MatchOutcome,
}

/// Lifecycle state of a game in the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameLifecycle {
    /// Listed in the public catalog.
    Active,
    /// Soft-deleted; hidden from the public catalog, restorable until the
    /// retention window elapses.
    Archived,
}

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the prediction bundle.
    pub name: String,
    /// Raw category string as uploaded (masked for public display).
    pub category: String,
    /// Price in major currency units; zero means freely accessible.
    pub price: Decimal,
    /// Combined odds across all picks.
    pub total_odds: Decimal,
    /// Booking code revealed only to entitled users.
    pub secret: String,
    /// Ordered list of match picks.
    pub matches: Vec<MatchEntity>,
    /// Soft-delete state.
    pub lifecycle: GameLifecycle,
    /// When the fixtures kick off, if known.
    pub kickoff_at: Option<SystemTime>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last update timestamp.
    pub updated_at: SystemTime,
    /// When the game was archived; `None` while active.
    pub archived_at: Option<SystemTime>,
}

impl GameEntity {
    /// Whether the game is freely accessible without an entitlement.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    /// Display category shown to the public, masking the free-form raw
    /// category string into a small fixed set.
    pub fn display_category(&self) -> String {
        display_category(&self.category)
    }
}

/// Normalize a raw category string into one of the display categories.
///
/// Falls back to the raw string when no known marker is present, and to
/// `"Unknown"` when the raw string is empty.
pub fn display_category(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    if lowered.contains("vip") {
        "VIP".to_owned()
    } else if lowered.contains("correct") {
        "Correct Score".to_owned()
    } else if lowered.contains("recovery") {
        "Recovery".to_owned()
    } else if lowered.contains("free") {
        "Free".to_owned()
    } else if raw.trim().is_empty() {
        "Unknown".to_owned()
    } else {
        raw.to_owned()
    }
}

/// Confirmed-payment ledger entry linking a user to a game.
///
/// Rows are created exactly once per provider transaction reference and
/// never mutated afterwards. Game metadata is denormalized so the record
/// stays meaningful if the game is later archived or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderEntity {
    /// Primary key of the ledger entry.
    pub id: Uuid,
    /// User the entitlement belongs to.
    pub user_id: String,
    /// Game the entitlement unlocks.
    pub game_id: Uuid,
    /// Provider transaction reference; unique across the ledger.
    pub reference: String,
    /// Amount actually charged, in major currency units.
    pub amount: Decimal,
    /// ISO currency code the charge was made in.
    pub currency: String,
    /// Game name at purchase time.
    pub game_name: String,
    /// Booking code at purchase time.
    pub secret: String,
    /// Raw category at purchase time.
    pub category: String,
    /// When the entitlement was recorded.
    pub created_at: SystemTime,
}
