//! database layer for givestream.
//!
//! this crate provides persistent storage for:
//! - Pledges
//! - Admin accounts
//! - Security log entries
//!
//! backed by sea-orm over sqlite (the default) or postgresql.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sea_orm_migration::MigratorTrait;

use givestream_types::{
    Admin, AdminId, Config, ERASED_PHONE_SENTINEL, NewAdmin, NewPledge, NewSecurityLog,
    PaymentMethod, Pledge, PledgeChanges, PledgeId, PledgeQuery, PledgeSortField, PledgeStats,
    PledgeStatus, SecurityLog, SortOrder,
};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// hard cap on page size for paginated listings.
pub const MAX_PAGE_SIZE: u64 = 100;

/// storage trait for givestream.
///
/// this trait abstracts over different database backends (sqlite, postgresql).
/// pledges are never physically deleted; pii erasure blanks the contact
/// columns on a retained row.
pub trait Store: Send + Sync {
    // ─── Health Check ─────────────────────────────────────────────────────────

    /// ping the database to verify connectivity.
    ///
    /// returns `ok(())` if the database is reachable, `err` otherwise.
    /// used for health checks with a recommended timeout of 1 second.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // ─── Pledge Operations ───────────────────────────────────────────────────

    /// persist a validated submission. returns the stored pledge with its
    /// assigned id, `pending` status and creation timestamps.
    fn create_pledge(&self, pledge: &NewPledge) -> impl Future<Output = Result<Pledge>> + Send;

    /// get a pledge by id. returns `none` if no such record exists.
    fn get_pledge(&self, id: PledgeId) -> impl Future<Output = Result<Option<Pledge>>> + Send;

    /// paginated listing over all pledges with optional status filter and
    /// sorting. returns the page of records plus the total count of records
    /// matching the filter. `page` is 1-based; `limit` is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    fn list_pledges(
        &self,
        query: &PledgeQuery,
    ) -> impl Future<Output = Result<(Vec<Pledge>, u64)>> + Send;

    /// confirmed pledges, newest first, at most `limit` records.
    fn list_confirmed(&self, limit: u64) -> impl Future<Output = Result<Vec<Pledge>>> + Send;

    /// confirmed pledges ranked by amount descending, at most `limit` records.
    fn top_confirmed(&self, limit: u64) -> impl Future<Output = Result<Vec<Pledge>>> + Send;

    /// apply a partial update and bump `updated_at`. fields absent from
    /// `changes` are left untouched. returns the updated record, or `none`
    /// if no such record exists.
    fn update_pledge(
        &self,
        id: PledgeId,
        changes: &PledgeChanges,
    ) -> impl Future<Output = Result<Option<Pledge>>> + Send;

    /// erase personal data from a pledge: name, email and message become
    /// null and the phone column is overwritten with the erasure sentinel.
    /// status and amount are untouched. idempotent; returns the record as
    /// stored afterwards, or `none` if no such record exists.
    fn erase_pledge(&self, id: PledgeId) -> impl Future<Output = Result<Option<Pledge>>> + Send;

    /// aggregate statistics over every pledge, recomputed on each call.
    fn pledge_stats(&self) -> impl Future<Output = Result<PledgeStats>> + Send;

    /// every pledge, newest first. used by the spreadsheet export.
    fn all_pledges(&self) -> impl Future<Output = Result<Vec<Pledge>>> + Send;

    // ─── Admin Operations ────────────────────────────────────────────────────

    /// look an admin up by login email. the lookup is case-insensitive
    /// (emails are stored lowercased).
    fn admin_by_email(&self, email: &str) -> impl Future<Output = Result<Option<Admin>>> + Send;

    /// get an admin by id. returns `none` if no such account exists.
    fn admin_by_id(&self, id: AdminId) -> impl Future<Output = Result<Option<Admin>>> + Send;

    /// create an admin account. returns the account with its assigned id.
    /// fails if the email is already taken.
    fn create_admin(&self, admin: &NewAdmin) -> impl Future<Output = Result<Admin>> + Send;

    /// list all admin accounts.
    fn list_admins(&self) -> impl Future<Output = Result<Vec<Admin>>> + Send;

    /// delete an admin account. returns whether a record was removed.
    fn delete_admin(&self, id: AdminId) -> impl Future<Output = Result<bool>> + Send;

    /// replace an admin's password hash. returns whether the account exists.
    fn set_admin_password_hash(
        &self,
        id: AdminId,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    // ─── Security Log Operations ─────────────────────────────────────────────

    /// append an entry to the security log.
    fn append_security_log(
        &self,
        entry: &NewSecurityLog,
    ) -> impl Future<Output = Result<SecurityLog>> + Send;

    /// delete security log entries created before `cutoff`. returns the
    /// number of entries removed.
    fn sweep_security_logs(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// total number of security log entries.
    fn count_security_logs(&self) -> impl Future<Output = Result<u64>> + Send;
}

/// the main store implementation using sea-orm.
#[derive(Clone)]
pub struct GivestreamDb {
    conn: DatabaseConnection,
}

impl GivestreamDb {
    /// create a new database connection from config.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::build_connection_url(&config.database)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };

        // enable WAL mode for sqlite if configured
        if config.database.db_type == "sqlite" && config.database.write_ahead_log {
            db.enable_wal_mode().await?;
        }

        db.migrate().await?;
        Ok(db)
    }

    /// enable write-ahead logging mode for sqlite.
    ///
    /// WAL mode allows concurrent reads during writes and generally
    /// improves performance. must be called before any writes.
    async fn enable_wal_mode(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .map_err(|e| Error::Connection(format!("failed to enable WAL mode: {}", e)))?;
        tracing::info!("sqlite WAL mode enabled");
        Ok(())
    }

    /// get the current sqlite journal mode.
    #[cfg(test)]
    async fn get_journal_mode(&self) -> Result<String> {
        use sea_orm::{ConnectionTrait, FromQueryResult};

        #[derive(FromQueryResult)]
        struct JournalMode {
            journal_mode: String,
        }

        let result: Option<JournalMode> = self
            .conn
            .query_one(sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                "PRAGMA journal_mode".to_string(),
            ))
            .await
            .map_err(|e| Error::Connection(e.to_string()))?
            .map(|row| JournalMode::from_query_result(&row, "").unwrap());

        Ok(result.map(|r| r.journal_mode).unwrap_or_default())
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &givestream_types::DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                // for sqlite, build the connection url with create mode
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // add ?mode=rwc to create file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => {
                // postgresql urls should already be properly formatted
                Ok(config.connection_string.clone())
            }
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }

    /// close the database connection.
    ///
    /// NOTE: sea-orm connections are reference-counted and cleaned up on drop.
    /// this method exists for explicit cleanup and logging purposes.
    pub async fn close(&self) -> Result<()> {
        tracing::debug!("database connection marked for close");
        Ok(())
    }

    fn sort_column(field: PledgeSortField) -> entity::pledge::Column {
        match field {
            PledgeSortField::CreatedAt => entity::pledge::Column::CreatedAt,
            PledgeSortField::UpdatedAt => entity::pledge::Column::UpdatedAt,
            PledgeSortField::Amount => entity::pledge::Column::Amount,
        }
    }
}

impl Store for GivestreamDb {
    // health check

    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    // pledge operations

    async fn create_pledge(&self, pledge: &NewPledge) -> Result<Pledge> {
        let now = Utc::now();
        let pledge = Pledge {
            id: PledgeId(0),
            name: pledge.name.as_ref().map(|n| n.as_str().to_string()),
            email: pledge.email.as_ref().map(|e| e.as_str().to_string()),
            phone: pledge.phone.as_str().to_string(),
            amount: pledge.amount,
            message: pledge.message.clone(),
            status: PledgeStatus::default(),
            payment_method: pledge.payment_method,
            created_at: now,
            updated_at: now,
        };
        let model: entity::pledge::ActiveModel = (&pledge).into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_pledge(&self, id: PledgeId) -> Result<Option<Pledge>> {
        let result = entity::pledge::Entity::find_by_id(id.0 as i64)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_pledges(&self, query: &PledgeQuery) -> Result<(Vec<Pledge>, u64)> {
        let mut find = entity::pledge::Entity::find();
        if let Some(status) = query.status {
            find = find.filter(entity::pledge::Column::Status.eq(status.as_str()));
        }

        let total = find.clone().count(&self.conn).await?;

        let order = match query.order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        };
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

        let results = find
            .order_by(Self::sort_column(query.sort_by), order.clone())
            // ties get a stable secondary order so pages never overlap
            .order_by(entity::pledge::Column::Id, order)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok((results.into_iter().map(Into::into).collect(), total))
    }

    async fn list_confirmed(&self, limit: u64) -> Result<Vec<Pledge>> {
        let results = entity::pledge::Entity::find()
            .filter(entity::pledge::Column::Status.eq(PledgeStatus::Confirmed.as_str()))
            .order_by_desc(entity::pledge::Column::CreatedAt)
            .order_by_desc(entity::pledge::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn top_confirmed(&self, limit: u64) -> Result<Vec<Pledge>> {
        let results = entity::pledge::Entity::find()
            .filter(entity::pledge::Column::Status.eq(PledgeStatus::Confirmed.as_str()))
            .order_by_desc(entity::pledge::Column::Amount)
            .order_by_desc(entity::pledge::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_pledge(&self, id: PledgeId, changes: &PledgeChanges) -> Result<Option<Pledge>> {
        let Some(mut pledge) = self.get_pledge(id).await? else {
            return Ok(None);
        };

        if let Some(status) = changes.status {
            pledge.status = status;
        }
        if let Some(payment_method) = changes.payment_method {
            pledge.payment_method = payment_method;
        }
        if let Some(name) = &changes.name {
            pledge.name = Some(name.as_str().to_string());
        }
        if let Some(message) = &changes.message {
            pledge.message = Some(message.clone());
        }
        if let Some(amount) = changes.amount {
            pledge.amount = amount;
        }
        pledge.updated_at = Utc::now();

        let model: entity::pledge::ActiveModel = (&pledge).into();
        let result = model.update(&self.conn).await?;
        Ok(Some(result.into()))
    }

    async fn erase_pledge(&self, id: PledgeId) -> Result<Option<Pledge>> {
        let Some(existing) = self.get_pledge(id).await? else {
            return Ok(None);
        };
        if existing.is_erased() {
            // repeat erasure must not change the record again
            return Ok(Some(existing));
        }

        entity::pledge::Entity::update_many()
            .col_expr(
                entity::pledge::Column::Name,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .col_expr(
                entity::pledge::Column::Email,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .col_expr(
                entity::pledge::Column::Message,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .col_expr(
                entity::pledge::Column::Phone,
                sea_orm::sea_query::Expr::value(ERASED_PHONE_SENTINEL),
            )
            .col_expr(
                entity::pledge::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(entity::pledge::Column::Id.eq(id.0 as i64))
            .exec(&self.conn)
            .await?;

        self.get_pledge(id).await
    }

    async fn pledge_stats(&self) -> Result<PledgeStats> {
        let pledges = self.all_pledges().await?;

        let mut stats = PledgeStats::default();
        for pledge in &pledges {
            match pledge.status {
                PledgeStatus::Pending => stats.counts_by_status.pending += 1,
                PledgeStatus::Confirmed => stats.counts_by_status.confirmed += 1,
                PledgeStatus::Rejected => stats.counts_by_status.rejected += 1,
            }
            match pledge.payment_method {
                PaymentMethod::Received => stats.counts_by_payment_method.received += 1,
                PaymentMethod::Pledged => stats.counts_by_payment_method.pledged += 1,
            }
            if pledge.is_confirmed() {
                stats.total_confirmed_count += 1;
                stats.total_confirmed_amount_sum += pledge.amount;
            }
        }

        Ok(stats)
    }

    async fn all_pledges(&self) -> Result<Vec<Pledge>> {
        let results = entity::pledge::Entity::find()
            .order_by_desc(entity::pledge::Column::CreatedAt)
            .order_by_desc(entity::pledge::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    // admin operations

    async fn admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let result = entity::admin::Entity::find()
            .filter(entity::admin::Column::Email.eq(email.to_lowercase()))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn admin_by_id(&self, id: AdminId) -> Result<Option<Admin>> {
        let result = entity::admin::Entity::find_by_id(id.0 as i64)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn create_admin(&self, admin: &NewAdmin) -> Result<Admin> {
        let admin = Admin {
            id: AdminId(0),
            name: admin.name.clone(),
            email: admin.email.lowercased(),
            password_hash: admin.password_hash.clone(),
            role: admin.role,
            created_at: Utc::now(),
        };
        let model: entity::admin::ActiveModel = (&admin).into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn list_admins(&self) -> Result<Vec<Admin>> {
        let results = entity::admin::Entity::find()
            .order_by_asc(entity::admin::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_admin(&self, id: AdminId) -> Result<bool> {
        let result = entity::admin::Entity::delete_by_id(id.0 as i64)
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn set_admin_password_hash(&self, id: AdminId, password_hash: &str) -> Result<bool> {
        let result = entity::admin::Entity::update_many()
            .col_expr(
                entity::admin::Column::PasswordHash,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .filter(entity::admin::Column::Id.eq(id.0 as i64))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    // security log operations

    async fn append_security_log(&self, entry: &NewSecurityLog) -> Result<SecurityLog> {
        let log = SecurityLog {
            id: 0,
            event: entry.event,
            actor: entry.actor.clone(),
            origin: entry.origin.clone(),
            detail: entry.detail.clone(),
            created_at: Utc::now(),
        };
        let model: entity::security_log::ActiveModel = (&log).into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn sweep_security_logs(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = entity::security_log::Entity::delete_many()
            .filter(entity::security_log::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn count_security_logs(&self) -> Result<u64> {
        let count = entity::security_log::Entity::find().count(&self.conn).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use givestream_types::{Role, SecurityEventKind};

    async fn setup_test_db() -> GivestreamDb {
        GivestreamDb::new_in_memory().await.unwrap()
    }

    fn sample_pledge(amount: i64) -> NewPledge {
        NewPledge {
            name: Some("Alice".parse().unwrap()),
            email: Some("alice@example.com".parse().unwrap()),
            phone: "+4512345678".parse().unwrap(),
            amount,
            message: Some("good luck!".to_string()),
            payment_method: PaymentMethod::Pledged,
        }
    }

    fn sample_admin(email: &str) -> NewAdmin {
        NewAdmin {
            name: "Ops".to_string(),
            email: email.parse().unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let db = setup_test_db().await;
        // should succeed for a healthy database
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_pledge_create_and_get() {
        let db = setup_test_db().await;

        let created = db.create_pledge(&sample_pledge(50)).await.unwrap();
        assert!(created.id.0 > 0);
        assert_eq!(created.status, PledgeStatus::Pending);
        assert_eq!(created.amount, 50);
        assert_eq!(created.name.as_deref(), Some("Alice"));
        assert_eq!(created.phone, "+4512345678");

        let fetched = db.get_pledge(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        // unknown id returns none
        let missing = db.get_pledge(PledgeId(9999)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_anonymous_pledge_roundtrip() {
        let db = setup_test_db().await;

        let new = NewPledge {
            name: None,
            email: None,
            phone: "+4512345678".parse().unwrap(),
            amount: 10,
            message: None,
            payment_method: PaymentMethod::Received,
        };
        let created = db.create_pledge(&new).await.unwrap();

        let fetched = db.get_pledge(created.id).await.unwrap().unwrap();
        assert!(fetched.name.is_none());
        assert!(fetched.email.is_none());
        assert!(fetched.message.is_none());
        assert_eq!(fetched.payment_method, PaymentMethod::Received);
    }

    #[tokio::test]
    async fn test_list_pledges_pagination() {
        let db = setup_test_db().await;

        for amount in [10, 20, 30, 40, 50] {
            db.create_pledge(&sample_pledge(amount)).await.unwrap();
        }

        // amount ascending, two per page
        let query = PledgeQuery {
            page: 1,
            limit: 2,
            status: None,
            sort_by: PledgeSortField::Amount,
            order: SortOrder::Asc,
        };
        let (page1, total) = db.list_pledges(&query).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page1.iter().map(|p| p.amount).collect::<Vec<_>>(), [10, 20]);

        let (page2, _) = db
            .list_pledges(&PledgeQuery { page: 2, ..query.clone() })
            .await
            .unwrap();
        assert_eq!(page2.iter().map(|p| p.amount).collect::<Vec<_>>(), [30, 40]);

        let (page3, _) = db
            .list_pledges(&PledgeQuery { page: 3, ..query.clone() })
            .await
            .unwrap();
        assert_eq!(page3.iter().map(|p| p.amount).collect::<Vec<_>>(), [50]);

        // past the end is empty, not an error
        let (page4, _) = db
            .list_pledges(&PledgeQuery { page: 4, ..query })
            .await
            .unwrap();
        assert!(page4.is_empty());
    }

    #[tokio::test]
    async fn test_list_pledges_status_filter() {
        let db = setup_test_db().await;

        let a = db.create_pledge(&sample_pledge(10)).await.unwrap();
        let b = db.create_pledge(&sample_pledge(20)).await.unwrap();
        db.create_pledge(&sample_pledge(30)).await.unwrap();

        let confirm = PledgeChanges {
            status: Some(PledgeStatus::Confirmed),
            ..Default::default()
        };
        db.update_pledge(a.id, &confirm).await.unwrap();
        db.update_pledge(b.id, &confirm).await.unwrap();

        let query = PledgeQuery {
            status: Some(PledgeStatus::Confirmed),
            ..Default::default()
        };
        let (confirmed, total) = db.list_pledges(&query).await.unwrap();
        assert_eq!(total, 2);
        assert!(confirmed.iter().all(|p| p.is_confirmed()));

        let query = PledgeQuery {
            status: Some(PledgeStatus::Rejected),
            ..Default::default()
        };
        let (rejected, total) = db.list_pledges(&query).await.unwrap();
        assert_eq!(total, 0);
        assert!(rejected.is_empty());
    }

    #[tokio::test]
    async fn test_list_pledges_clamps_limit() {
        let db = setup_test_db().await;
        db.create_pledge(&sample_pledge(10)).await.unwrap();

        // zero limit is bumped to one rather than returning nothing
        let query = PledgeQuery {
            limit: 0,
            ..Default::default()
        };
        let (rows, total) = db.list_pledges(&query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_update_pledge() {
        let db = setup_test_db().await;

        let created = db.create_pledge(&sample_pledge(50)).await.unwrap();

        let changes = PledgeChanges {
            status: Some(PledgeStatus::Confirmed),
            amount: Some(75),
            message: Some("corrected".to_string()),
            ..Default::default()
        };
        let updated = db.update_pledge(created.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.status, PledgeStatus::Confirmed);
        assert_eq!(updated.amount, 75);
        assert_eq!(updated.message.as_deref(), Some("corrected"));
        // untouched fields survive
        assert_eq!(updated.name.as_deref(), Some("Alice"));
        assert!(updated.updated_at >= created.updated_at);

        // unknown id returns none
        let missing = db.update_pledge(PledgeId(9999), &changes).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_erase_pledge_is_idempotent() {
        let db = setup_test_db().await;

        let created = db.create_pledge(&sample_pledge(50)).await.unwrap();
        db.update_pledge(
            created.id,
            &PledgeChanges {
                status: Some(PledgeStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let erased = db.erase_pledge(created.id).await.unwrap().unwrap();
        assert!(erased.is_erased());
        assert!(erased.name.is_none());
        assert!(erased.email.is_none());
        assert!(erased.message.is_none());
        assert_eq!(erased.phone, ERASED_PHONE_SENTINEL);
        // the record itself survives erasure
        assert_eq!(erased.amount, 50);
        assert_eq!(erased.status, PledgeStatus::Confirmed);

        // a second erasure changes nothing, including updated_at
        let again = db.erase_pledge(created.id).await.unwrap().unwrap();
        assert_eq!(again, erased);

        // unknown id returns none
        let missing = db.erase_pledge(PledgeId(9999)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_pledge_stats() {
        let db = setup_test_db().await;

        // two confirmed (30 + 50), one pending, one rejected
        let confirm = PledgeChanges {
            status: Some(PledgeStatus::Confirmed),
            ..Default::default()
        };
        let a = db.create_pledge(&sample_pledge(30)).await.unwrap();
        db.update_pledge(a.id, &confirm).await.unwrap();
        let b = db.create_pledge(&sample_pledge(50)).await.unwrap();
        db.update_pledge(b.id, &confirm).await.unwrap();
        db.create_pledge(&sample_pledge(100)).await.unwrap();
        let d = db.create_pledge(&sample_pledge(7)).await.unwrap();
        db.update_pledge(
            d.id,
            &PledgeChanges {
                status: Some(PledgeStatus::Rejected),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let stats = db.pledge_stats().await.unwrap();
        assert_eq!(stats.total_confirmed_count, 2);
        assert_eq!(stats.total_confirmed_amount_sum, 80);
        assert_eq!(stats.counts_by_status.pending, 1);
        assert_eq!(stats.counts_by_status.confirmed, 2);
        assert_eq!(stats.counts_by_status.rejected, 1);
        assert_eq!(stats.counts_by_payment_method.pledged, 4);
        assert_eq!(stats.counts_by_payment_method.received, 0);
    }

    #[tokio::test]
    async fn test_stats_on_empty_store() {
        let db = setup_test_db().await;
        let stats = db.pledge_stats().await.unwrap();
        assert_eq!(stats, PledgeStats::default());
    }

    #[tokio::test]
    async fn test_top_confirmed_ranking() {
        let db = setup_test_db().await;

        let confirm = PledgeChanges {
            status: Some(PledgeStatus::Confirmed),
            ..Default::default()
        };
        for amount in [10, 500, 50, 200, 90, 40] {
            let p = db.create_pledge(&sample_pledge(amount)).await.unwrap();
            db.update_pledge(p.id, &confirm).await.unwrap();
        }
        // a large pending pledge must not appear in the ranking
        db.create_pledge(&sample_pledge(10_000)).await.unwrap();

        let top = db.top_confirmed(5).await.unwrap();
        assert_eq!(
            top.iter().map(|p| p.amount).collect::<Vec<_>>(),
            [500, 200, 90, 50, 40]
        );
    }

    #[tokio::test]
    async fn test_list_confirmed_only_confirmed() {
        let db = setup_test_db().await;

        let a = db.create_pledge(&sample_pledge(10)).await.unwrap();
        db.create_pledge(&sample_pledge(20)).await.unwrap();
        db.update_pledge(
            a.id,
            &PledgeChanges {
                status: Some(PledgeStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let confirmed = db.list_confirmed(50).await.unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, a.id);
    }

    #[tokio::test]
    async fn test_admin_crud() {
        let db = setup_test_db().await;

        let created = db.create_admin(&sample_admin("Ops@Example.COM")).await.unwrap();
        assert!(created.id.0 > 0);
        // stored lowercased
        assert_eq!(created.email, "ops@example.com");

        // lookup is case-insensitive
        let fetched = db.admin_by_email("OPS@example.com").await.unwrap();
        assert!(fetched.is_some());

        let by_id = db.admin_by_id(created.id).await.unwrap();
        assert!(by_id.is_some());

        let admins = db.list_admins().await.unwrap();
        assert_eq!(admins.len(), 1);

        // replace the password hash
        let replaced = db
            .set_admin_password_hash(created.id, "$argon2id$new")
            .await
            .unwrap();
        assert!(replaced);
        let fetched = db.admin_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.password_hash, "$argon2id$new");

        // delete
        let deleted = db.delete_admin(created.id).await.unwrap();
        assert!(deleted);
        let gone = db.admin_by_id(created.id).await.unwrap();
        assert!(gone.is_none());
        // second delete reports nothing removed
        let deleted = db.delete_admin(created.id).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_duplicate_admin_email_rejected() {
        let db = setup_test_db().await;

        db.create_admin(&sample_admin("ops@example.com")).await.unwrap();

        // same address with different casing still collides
        let result = db.create_admin(&sample_admin("OPS@example.com")).await;
        assert!(result.is_err(), "duplicate admin email should be rejected");
    }

    #[tokio::test]
    async fn test_set_password_hash_for_missing_admin() {
        let db = setup_test_db().await;
        let replaced = db
            .set_admin_password_hash(AdminId(42), "$argon2id$new")
            .await
            .unwrap();
        assert!(!replaced);
    }

    #[tokio::test]
    async fn test_security_log_append_and_count() {
        let db = setup_test_db().await;

        let entry = NewSecurityLog::new(SecurityEventKind::Login, "203.0.113.9")
            .actor("ops@example.com")
            .detail(serde_json::json!({"success": false}));
        let stored = db.append_security_log(&entry).await.unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.event, SecurityEventKind::Login);
        assert_eq!(stored.actor.as_deref(), Some("ops@example.com"));
        assert_eq!(stored.detail["success"], serde_json::json!(false));

        db.append_security_log(&NewSecurityLog::new(
            SecurityEventKind::RateLimit,
            "203.0.113.9",
        ))
        .await
        .unwrap();

        assert_eq!(db.count_security_logs().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_security_log_sweep() {
        let db = setup_test_db().await;

        for _ in 0..3 {
            db.append_security_log(&NewSecurityLog::new(
                SecurityEventKind::PledgeSubmit,
                "203.0.113.9",
            ))
            .await
            .unwrap();
        }

        // a cutoff in the past removes nothing
        let removed = db
            .sweep_security_logs(Utc::now() - Duration::days(365))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(db.count_security_logs().await.unwrap(), 3);

        // a cutoff in the future removes everything
        let removed = db
            .sweep_security_logs(Utc::now() + Duration::seconds(5))
            .await
            .unwrap();
        assert_eq!(removed, 3);
        assert_eq!(db.count_security_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_wal_mode_enabled() {
        // WAL mode requires a file-based database, not :memory:
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test_wal.db");

        let mut config = Config::default();
        config.database.db_type = "sqlite".to_string();
        config.database.connection_string = db_path.to_string_lossy().to_string();
        config.database.write_ahead_log = true;

        let db = GivestreamDb::new(&config).await.unwrap();
        let mode = db.get_journal_mode().await.unwrap();

        // WAL mode should be enabled
        assert_eq!(mode.to_lowercase(), "wal", "journal mode should be WAL");
    }

    #[tokio::test]
    async fn test_sqlite_wal_mode_not_used_in_memory() {
        // default in-memory db should not have WAL
        let db = setup_test_db().await;
        let mode = db.get_journal_mode().await.unwrap();

        // in-memory sqlite uses "memory" journal mode, not "wal"
        assert_ne!(mode.to_lowercase(), "wal", "in-memory db should not use WAL");
    }
}
