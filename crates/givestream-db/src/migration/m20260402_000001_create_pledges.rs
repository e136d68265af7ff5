//! create pledges table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pledges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pledges::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pledges::Name).string().null())
                    .col(ColumnDef::new(Pledges::Email).string().null())
                    .col(ColumnDef::new(Pledges::Phone).string().not_null())
                    .col(ColumnDef::new(Pledges::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Pledges::Message).text().null())
                    .col(ColumnDef::new(Pledges::Status).string().not_null())
                    .col(ColumnDef::new(Pledges::PaymentMethod).string().not_null())
                    .col(
                        ColumnDef::new(Pledges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pledges::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // index on status for the public feed and filtered admin listings
        manager
            .create_index(
                Index::create()
                    .name("idx_pledges_status")
                    .table(Pledges::Table)
                    .col(Pledges::Status)
                    .to_owned(),
            )
            .await?;

        // index on created_at for newest-first ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_pledges_created_at")
                    .table(Pledges::Table)
                    .col(Pledges::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // index on amount for the top-pledges ranking
        manager
            .create_index(
                Index::create()
                    .name("idx_pledges_amount")
                    .table(Pledges::Table)
                    .col(Pledges::Amount)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pledges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Pledges {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Amount,
    Message,
    Status,
    PaymentMethod,
    CreatedAt,
    UpdatedAt,
}
