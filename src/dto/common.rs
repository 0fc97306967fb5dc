use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::{MatchEntity, MatchOutcome};

/// Full projection of a match pick, exposed to entitled users and admins.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchView {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    #[schema(value_type = String)]
    pub odds: Decimal,
    pub outcome: MatchOutcome,
}

impl From<MatchEntity> for MatchView {
    fn from(value: MatchEntity) -> Self {
        Self {
            home_team: value.home_team,
            away_team: value.away_team,
            league: value.league,
            odds: value.odds,
            outcome: value.outcome,
        }
    }
}
