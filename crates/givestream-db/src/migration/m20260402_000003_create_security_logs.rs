//! create security_logs table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SecurityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecurityLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SecurityLogs::Event).string().not_null())
                    .col(ColumnDef::new(SecurityLogs::Actor).string().null())
                    .col(ColumnDef::new(SecurityLogs::Origin).string().not_null())
                    .col(
                        ColumnDef::new(SecurityLogs::Detail)
                            .text()
                            .not_null()
                            .default("null"),
                    )
                    .col(
                        ColumnDef::new(SecurityLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // the retention sweeper deletes by created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_security_logs_created_at")
                    .table(SecurityLogs::Table)
                    .col(SecurityLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecurityLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SecurityLogs {
    Table,
    Id,
    Event,
    Actor,
    Origin,
    Detail,
    CreatedAt,
}
