//! Create `school` table.
//!
//! Root entity; students reference it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(School::Table)
                    .if_not_exists()
                    .col(pk_auto(School::Id))
                    .col(string_len(School::Name, 100).unique_key().not_null())
                    .col(
                        integer(School::Capacity)
                            .not_null()
                            .check(Expr::col(School::Capacity).gt(0)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(School::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum School { Table, Id, Name, Capacity }
