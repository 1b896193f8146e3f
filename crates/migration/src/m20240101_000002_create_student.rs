//! Create `student` table with FK to `school`.
//!
//! The id is a client-supplied token of at most nine characters.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(string_len(Student::Id, 9).primary_key())
                    .col(string_len(Student::FirstName, 50).not_null())
                    .col(string_len(Student::LastName, 50).not_null())
                    .col(integer(Student::SchoolId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_school_id_school")
                            .from(Student::Table, Student::SchoolId)
                            .to(School::Table, School::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Student::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Id, FirstName, LastName, SchoolId }

#[derive(DeriveIden)]
enum School { Table, Id }
