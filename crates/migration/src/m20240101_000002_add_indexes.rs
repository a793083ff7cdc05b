use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Active-account listing filters on closing_date IS NULL
        manager
            .create_index(
                Index::create()
                    .name("idx_user_details_closing_date")
                    .table(UserDetails::Table)
                    .col(UserDetails::ClosingDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_details_closing_date")
                    .table(UserDetails::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum UserDetails { Table, ClosingDate }
