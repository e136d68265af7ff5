//! error type for database operations.

/// errors arising from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// failed to connect to or configure the database.
    #[error("database connection error: {0}")]
    Connection(String),

    /// a migration failed to apply.
    #[error("database migration error: {0}")]
    Migration(String),

    /// configuration or stored data was not usable.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// an underlying query failed.
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    /// stored json could not be encoded or decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
