//! User store.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppResult, OptionExt};
use domain::User;

/// Column values of a user row about to be inserted.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_group_id: i32,
}

impl UserRecord {
    fn into_active_model(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            name: Set(self.name),
            email: Set(self.email),
            password_hash: Set(self.password_hash),
            user_group_id: Set(self.user_group_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

/// Partial user update. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub user_group_id: Option<i32>,
}

/// Typed access to the `users` table.
pub struct UserStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(self.conn).await?;
        Ok(result.map(User::from))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn)
            .await?;

        Ok(result.map(User::from))
    }

    /// Find a user by name within one group
    pub async fn find_by_scoped_name(&self, user_group_id: i32, name: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::UserGroupId.eq(user_group_id))
            .filter(user::Column::Name.eq(name))
            .one(self.conn)
            .await?;

        Ok(result.map(User::from))
    }

    /// Group id of a user, `None` if the user does not exist.
    pub async fn group_of(&self, user_id: i32) -> AppResult<Option<i32>> {
        let group_id = UserEntity::find_by_id(user_id)
            .select_only()
            .column(user::Column::UserGroupId)
            .into_tuple::<i32>()
            .one(self.conn)
            .await?;

        Ok(group_id)
    }

    pub async fn create(&self, record: UserRecord) -> AppResult<User> {
        let model = record.into_active_model().insert(self.conn).await?;
        Ok(User::from(model))
    }

    /// Bulk insert; returns the number of rows written.
    pub async fn insert_many(&self, records: Vec<UserRecord>) -> AppResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows = UserEntity::insert_many(records.into_iter().map(UserRecord::into_active_model))
            .exec_without_returning(self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = user.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(user_group_id) = changes.user_group_id {
            active.user_group_id = Set(user_group_id);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(User::from(model))
    }

    /// Users of one group, ordered by name
    pub async fn list_by_group(&self, user_group_id: i32) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::UserGroupId.eq(user_group_id))
            .order_by_asc(user::Column::Name)
            .order_by_asc(user::Column::Id)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    /// All users, ordered by name
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Name)
            .order_by_asc(user::Column::Id)
            .all(self.conn)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
