//! Category store.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::entities::category::{self, ActiveModel, Entity as CategoryEntity};
use common::{AppResult, OptionExt};
use domain::Category;

fn new_active_model(user_group_id: i32, name: String) -> ActiveModel {
    let now = Utc::now();
    ActiveModel {
        name: Set(name),
        user_group_id: Set(user_group_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// Typed access to the `categories` table.
pub struct CategoryStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CategoryStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(self.conn).await?;
        Ok(result.map(Category::from))
    }

    /// Find a category by name within one group
    pub async fn find_by_scoped_name(
        &self,
        user_group_id: i32,
        name: &str,
    ) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::UserGroupId.eq(user_group_id))
            .filter(category::Column::Name.eq(name))
            .one(self.conn)
            .await?;

        Ok(result.map(Category::from))
    }

    pub async fn create(&self, user_group_id: i32, name: String) -> AppResult<Category> {
        let model = new_active_model(user_group_id, name).insert(self.conn).await?;
        Ok(Category::from(model))
    }

    /// Bulk insert into one group; returns the number of rows written.
    pub async fn insert_many(&self, user_group_id: i32, names: Vec<String>) -> AppResult<u64> {
        if names.is_empty() {
            return Ok(0);
        }

        let rows = CategoryEntity::insert_many(
            names
                .into_iter()
                .map(|name| new_active_model(user_group_id, name)),
        )
        .exec_without_returning(self.conn)
        .await?;

        Ok(rows)
    }

    pub async fn update_name(&self, id: i32, name: String) -> AppResult<Category> {
        let category = CategoryEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = category.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(Category::from(model))
    }

    /// Categories of one group, ordered by name
    pub async fn list_by_group(&self, user_group_id: i32) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .filter(category::Column::UserGroupId.eq(user_group_id))
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(Category::from).collect())
    }
}
