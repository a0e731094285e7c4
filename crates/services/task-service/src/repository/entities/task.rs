//! Task database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Task, TaskStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub creator_user_id: i32,
    pub responsible_user_id: i32,
    pub category_id: i32,
    /// Numeric `TaskStatus` code (1..=4)
    pub status: i32,
    pub estimate: Option<i32>,
    pub start_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// A task references its users twice, so only the category side is `Related`.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorUserId",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ResponsibleUserId",
        to = "super::user::Column::Id"
    )]
    Responsible,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
///
/// Fails only if the row carries a status code outside 1..=4.
impl TryFrom<Model> for Task {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Task {
            id: model.id,
            title: model.title,
            description: model.description,
            creator_user_id: model.creator_user_id,
            responsible_user_id: model.responsible_user_id,
            category_id: model.category_id,
            status: TaskStatus::try_from(model.status)?,
            estimate: model.estimate,
            start_date: model.start_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
