//! User group store.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};

use super::entities::user_group::{self, ActiveModel, Entity as UserGroupEntity};
use common::{AppResult, OptionExt};
use domain::UserGroup;

/// Typed access to the `user_groups` table.
pub struct UserGroupStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserGroupStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<UserGroup>> {
        let result = UserGroupEntity::find_by_id(id).one(self.conn).await?;
        Ok(result.map(UserGroup::from))
    }

    /// Insert a group with a database-assigned id.
    pub async fn create(&self, name: String) -> AppResult<UserGroup> {
        let now = Utc::now();
        let active_model = ActiveModel {
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        Ok(UserGroup::from(model))
    }

    /// Insert a group under a reserved, caller-chosen id.
    ///
    /// Fails with `ConstraintViolation` if the id is already taken.
    pub async fn create_with_id(&self, id: i32, name: String) -> AppResult<UserGroup> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(id),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.conn).await?;
        Ok(UserGroup::from(model))
    }

    pub async fn update_name(&self, id: i32, name: String) -> AppResult<UserGroup> {
        let group = UserGroupEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = group.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(UserGroup::from(model))
    }

    /// All groups, ordered by name
    pub async fn list_all(&self) -> AppResult<Vec<UserGroup>> {
        let models = UserGroupEntity::find()
            .order_by_asc(user_group::Column::Name)
            .order_by_asc(user_group::Column::Id)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(UserGroup::from).collect())
    }
}
