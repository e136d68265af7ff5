//! security log entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use givestream_types::{SecurityEventKind, SecurityLog};

/// security log database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "security_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// stored as the kebab-case wire form (e.g., `token-refresh`).
    pub event: String,
    pub actor: Option<String>,
    pub origin: String,
    /// structured context stored as a json string (e.g., `{"path":"/api/auth/login"}`).
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SecurityLog {
    fn from(model: Model) -> Self {
        // parse the detail json string, defaulting to null on bad rows
        let detail = serde_json::from_str(&model.detail).unwrap_or(serde_json::Value::Null);

        SecurityLog {
            id: model.id as u64,
            // a row whose kind we no longer recognize is itself suspicious
            event: model
                .event
                .parse()
                .unwrap_or(SecurityEventKind::Suspicious),
            actor: model.actor,
            origin: model.origin,
            detail,
            created_at: model.created_at,
        }
    }
}

impl From<&SecurityLog> for ActiveModel {
    fn from(log: &SecurityLog) -> Self {
        ActiveModel {
            id: if log.id == 0 {
                NotSet
            } else {
                Set(log.id as i64)
            },
            event: Set(log.event.as_str().to_string()),
            actor: Set(log.actor.clone()),
            origin: Set(log.origin.clone()),
            detail: Set(log.detail.to_string()),
            created_at: Set(log.created_at),
        }
    }
}
