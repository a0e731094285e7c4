//! Task store.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{ConditionalStatement, Query},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::category;
use super::entities::task::{self, ActiveModel, Entity as TaskEntity};
use common::{AppError, AppResult, OptionExt};
use domain::{Task, TaskPatch, TaskStatus};

/// Column values of a task row about to be inserted.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub title: String,
    pub description: String,
    pub creator_user_id: i32,
    pub responsible_user_id: i32,
    pub category_id: i32,
    pub status: TaskStatus,
    pub estimate: Option<i32>,
    pub start_date: DateTime<Utc>,
}

impl TaskRecord {
    fn into_active_model(self) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            title: Set(self.title),
            description: Set(self.description),
            creator_user_id: Set(self.creator_user_id),
            responsible_user_id: Set(self.responsible_user_id),
            category_id: Set(self.category_id),
            status: Set(self.status.code()),
            estimate: Set(self.estimate),
            start_date: Set(self.start_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

fn into_tasks(models: Vec<task::Model>) -> AppResult<Vec<Task>> {
    models
        .into_iter()
        .map(|m| Task::try_from(m).map_err(AppError::from))
        .collect()
}

/// Typed access to the `tasks` table.
pub struct TaskStore<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> TaskStore<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Task>> {
        match TaskEntity::find_by_id(id).one(self.conn).await? {
            Some(model) => Ok(Some(Task::try_from(model)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, record: TaskRecord) -> AppResult<Task> {
        let model = record.into_active_model().insert(self.conn).await?;
        Ok(Task::try_from(model)?)
    }

    /// Bulk insert; returns the number of rows written.
    pub async fn insert_many(&self, records: Vec<TaskRecord>) -> AppResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows = TaskEntity::insert_many(records.into_iter().map(TaskRecord::into_active_model))
            .exec_without_returning(self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn update(&self, id: i32, patch: TaskPatch) -> AppResult<Task> {
        let task = TaskEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = task.into();

        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(responsible_user_id) = patch.responsible_user_id {
            active.responsible_user_id = Set(responsible_user_id);
        }
        if let Some(category_id) = patch.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.code());
        }
        if let Some(estimate) = patch.estimate {
            active.estimate = Set(estimate);
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = Set(start_date);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(Task::try_from(model)?)
    }

    /// Leaf delete. Nothing references a task, so no cascade is involved.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = TaskEntity::delete_by_id(id).exec(self.conn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    /// Tasks filed under one category
    pub async fn list_by_category(&self, category_id: i32) -> AppResult<Vec<Task>> {
        let models = TaskEntity::find()
            .filter(task::Column::CategoryId.eq(category_id))
            .order_by_asc(task::Column::StartDate)
            .order_by_asc(task::Column::Id)
            .all(self.conn)
            .await?;

        into_tasks(models)
    }

    /// Tasks whose category belongs to the group, ordered by start date
    pub async fn list_by_group(&self, user_group_id: i32) -> AppResult<Vec<Task>> {
        self.list_by_group_and_statuses(user_group_id, &[]).await
    }

    /// Same as [`Self::list_by_group`], restricted to the given statuses.
    /// An empty status list means "any status".
    pub async fn list_by_group_and_statuses(
        &self,
        user_group_id: i32,
        statuses: &[TaskStatus],
    ) -> AppResult<Vec<Task>> {
        let group_categories = Query::select()
            .column(category::Column::Id)
            .from(category::Entity)
            .and_where(category::Column::UserGroupId.eq(user_group_id))
            .to_owned();

        let mut query = TaskEntity::find().filter(task::Column::CategoryId.in_subquery(group_categories));

        if !statuses.is_empty() {
            query = query.filter(task::Column::Status.is_in(statuses.iter().map(|s| s.code())));
        }

        let models = query
            .order_by_asc(task::Column::StartDate)
            .order_by_asc(task::Column::Id)
            .all(self.conn)
            .await?;

        into_tasks(models)
    }
}
