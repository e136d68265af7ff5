//! admin account entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use givestream_types::{Admin, AdminId};

/// admin database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    /// stored as the lowercase wire form (e.g., `admin`).
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Admin {
    fn from(model: Model) -> Self {
        Admin {
            id: AdminId(model.id as u64),
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role.parse().unwrap_or_default(),
            created_at: model.created_at,
        }
    }
}

impl From<&Admin> for ActiveModel {
    fn from(admin: &Admin) -> Self {
        ActiveModel {
            id: if admin.id.0 == 0 {
                NotSet
            } else {
                Set(admin.id.0 as i64)
            },
            name: Set(admin.name.clone()),
            email: Set(admin.email.clone()),
            password_hash: Set(admin.password_hash.clone()),
            role: Set(admin.role.as_str().to_string()),
            created_at: Set(admin.created_at),
        }
    }
}
