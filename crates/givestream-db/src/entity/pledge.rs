//! pledge entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use givestream_types::{Pledge, PledgeId};

/// pledge database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pledges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub amount: i64,
    pub message: Option<String>,
    /// stored as the lowercase wire form (e.g., `pending`).
    pub status: String,
    /// stored as the lowercase wire form (e.g., `pledged`).
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Pledge {
    fn from(model: Model) -> Self {
        Pledge {
            id: PledgeId(model.id as u64),
            name: model.name,
            email: model.email,
            phone: model.phone,
            amount: model.amount,
            message: model.message,
            // unknown stored values fall back to the state defaults
            status: model.status.parse().unwrap_or_default(),
            payment_method: model.payment_method.parse().unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Pledge> for ActiveModel {
    fn from(pledge: &Pledge) -> Self {
        ActiveModel {
            id: if pledge.id.0 == 0 {
                NotSet
            } else {
                Set(pledge.id.0 as i64)
            },
            name: Set(pledge.name.clone()),
            email: Set(pledge.email.clone()),
            phone: Set(pledge.phone.clone()),
            amount: Set(pledge.amount),
            message: Set(pledge.message.clone()),
            status: Set(pledge.status.as_str().to_string()),
            payment_method: Set(pledge.payment_method.as_str().to_string()),
            created_at: Set(pledge.created_at),
            updated_at: Set(pledge.updated_at),
        }
    }
}
