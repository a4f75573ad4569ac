//! Create `question` table with FKs to `user` and `module`.
//!
//! Rows are hard-deleted; no tombstone column.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(pk_auto(Question::Id))
                    .col(integer(Question::UserId).not_null())
                    .col(integer(Question::ModuleId).not_null())
                    .col(string_len(Question::Title, 255).not_null())
                    .col(string_len(Question::Tags, 255).not_null())
                    .col(text(Question::Description).not_null())
                    .col(timestamp_with_time_zone(Question::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Question::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_user")
                            .from(Question::Table, Question::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_module")
                            .from(Question::Table, Question::ModuleId)
                            .to(Module::Table, Module::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Question::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Question {
    Table,
    Id,
    UserId,
    ModuleId,
    Title,
    Tags,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Module { Table, Id }
