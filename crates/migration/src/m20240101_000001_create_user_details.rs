//! Create `user_details` table.
//!
//! One row per account; `closing_date` stays NULL while the account is active.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserDetails::Table)
                    .if_not_exists()
                    .col(string_len(UserDetails::UserId, 64).primary_key())
                    .col(string_len(UserDetails::AccountType, 64).not_null())
                    .col(date(UserDetails::OpeningDate).not_null())
                    .col(
                        ColumnDef::new(UserDetails::ClosingDate)
                            .date()
                            .null(),
                    )
                    .col(double(UserDetails::Lop).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserDetails::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserDetails { Table, UserId, AccountType, OpeningDate, ClosingDate, Lop }
