//! database migrations for givestream.

pub use sea_orm_migration::prelude::*;

mod m20260402_000001_create_pledges;
mod m20260402_000002_create_admins;
mod m20260402_000003_create_security_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260402_000001_create_pledges::Migration),
            Box::new(m20260402_000002_create_admins::Migration),
            Box::new(m20260402_000003_create_security_logs::Migration),
        ]
    }
}
