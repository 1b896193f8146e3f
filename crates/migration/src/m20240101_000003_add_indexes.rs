//! Secondary indexes for the lookups the service performs.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // capacity checks and nested listings filter by school
        manager
            .create_index(
                Index::create()
                    .name("ix_student_school_id")
                    .table(Student::Table)
                    .col(Student::SchoolId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_student_last_name")
                    .table(Student::Table)
                    .col(Student::LastName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("ix_student_last_name").table(Student::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("ix_student_school_id").table(Student::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Student { Table, SchoolId, LastName }
