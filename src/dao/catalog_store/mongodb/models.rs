use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{GameEntity, GameLifecycle, MatchEntity, OrderEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    category: String,
    price: Decimal,
    total_odds: Decimal,
    secret: String,
    matches: Vec<MatchEntity>,
    lifecycle: GameLifecycle,
    kickoff_at: Option<DateTime>,
    created_at: DateTime,
    updated_at: DateTime,
    archived_at: Option<DateTime>,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            price: value.price,
            total_odds: value.total_odds,
            secret: value.secret,
            matches: value.matches,
            lifecycle: value.lifecycle,
            kickoff_at: value.kickoff_at.map(DateTime::from_system_time),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            archived_at: value.archived_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            price: value.price,
            total_odds: value.total_odds,
            secret: value.secret,
            matches: value.matches,
            lifecycle: value.lifecycle,
            kickoff_at: value.kickoff_at.map(|at| at.to_system_time()),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            archived_at: value.archived_at.map(|at| at.to_system_time()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoOrderDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    user_id: String,
    game_id: Uuid,
    reference: String,
    amount: Decimal,
    currency: String,
    game_name: String,
    secret: String,
    category: String,
    created_at: DateTime,
}

impl From<OrderEntity> for MongoOrderDocument {
    fn from(value: OrderEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            game_id: value.game_id,
            reference: value.reference,
            amount: value.amount,
            currency: value.currency,
            game_name: value.game_name,
            secret: value.secret,
            category: value.category,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<MongoOrderDocument> for OrderEntity {
    fn from(value: MongoOrderDocument) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            game_id: value.game_id,
            reference: value.reference,
            amount: value.amount,
            currency: value.currency,
            game_name: value.game_name,
            secret: value.secret,
            category: value.category,
            created_at: value.created_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

/// BSON tag stored for a lifecycle value, matching the serde rename.
pub fn lifecycle_tag(lifecycle: GameLifecycle) -> &'static str {
    match lifecycle {
        GameLifecycle::Active => "active",
        GameLifecycle::Archived => "archived",
    }
}
