use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Question: lookups by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_question_user")
                    .table(Question::Table)
                    .col(Question::UserId)
                    .to_owned(),
            )
            .await?;

        // Question: listing by module
        manager
            .create_index(
                Index::create()
                    .name("idx_question_module")
                    .table(Question::Table)
                    .col(Question::ModuleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_question_module").table(Question::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_question_user").table(Question::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Question { Table, UserId, ModuleId }
