//! Migration: Create tasks table.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_users_table::Users;
use super::m20240101_000003_create_categories_table::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Tasks::Description).text().not_null())
                    .col(ColumnDef::new(Tasks::CreatorUserId).integer().not_null())
                    .col(ColumnDef::new(Tasks::ResponsibleUserId).integer().not_null())
                    .col(ColumnDef::new(Tasks::CategoryId).integer().not_null())
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .integer()
                            .not_null()
                            .check(Expr::col(Tasks::Status).between(1, 4)),
                    )
                    .col(ColumnDef::new(Tasks::Estimate).integer().null())
                    .col(
                        ColumnDef::new(Tasks::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_creator_user_id")
                            .from(Tasks::Table, Tasks::CreatorUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_responsible_user_id")
                            .from(Tasks::Table, Tasks::ResponsibleUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_category_id")
                            .from(Tasks::Table, Tasks::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_category_id")
                    .table(Tasks::Table)
                    .col(Tasks::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    CreatorUserId,
    ResponsibleUserId,
    CategoryId,
    Status,
    Estimate,
    StartDate,
    CreatedAt,
    UpdatedAt,
}
