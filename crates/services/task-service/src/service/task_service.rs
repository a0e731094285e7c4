//! Task service - tasks of the acting user's group.
//!
//! A task is visible to a user when its category belongs to the user's
//! group. The category and the responsible user of a task must both be in
//! that group.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{NewTask, Task, TaskPatch, TaskStatus};

use super::category_service::{actor_group, owned_category};
use crate::infra::UnitOfWork;
use crate::repository::{CategoryStore, TaskRecord, UserStore};

async fn ensure_member<C: ConnectionTrait>(
    users: &UserStore<'_, C>,
    user_id: i32,
    user_group_id: i32,
) -> AppResult<()> {
    let user = users.find_by_id(user_id).await?.ok_or_not_found()?;
    if user.user_group_id != user_group_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Load a task whose category is in the group.
async fn owned_task<C: ConnectionTrait>(
    tasks: &crate::repository::TaskStore<'_, C>,
    categories: &CategoryStore<'_, C>,
    task_id: i32,
    user_group_id: i32,
) -> AppResult<Task> {
    let task = tasks.find_by_id(task_id).await?.ok_or_not_found()?;
    owned_category(categories, task.category_id, user_group_id).await?;
    Ok(task)
}

/// Task service trait for dependency injection.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn get_task(&self, actor_id: i32, task_id: i32) -> AppResult<Task>;

    /// Not started, in progress and done tasks, ordered by start date
    async fn list_task_board(&self, actor_id: i32) -> AppResult<Vec<Task>>;

    /// Look-back tasks, ordered by start date
    async fn list_look_back(&self, actor_id: i32) -> AppResult<Vec<Task>>;

    /// Create a task with the actor as creator
    async fn create_task(&self, actor_id: i32, input: NewTask) -> AppResult<Task>;

    async fn update_task(&self, actor_id: i32, task_id: i32, patch: TaskPatch) -> AppResult<Task>;

    /// Leaf delete; nothing depends on a task
    async fn delete_task(&self, actor_id: i32, task_id: i32) -> AppResult<()>;
}

/// Concrete implementation of TaskService using Unit of Work.
pub struct TaskManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TaskManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn list_with_statuses(&self, actor_id: i32, statuses: &[TaskStatus]) -> AppResult<Vec<Task>> {
        let user_group_id = actor_group(&self.uow.users(), actor_id).await?;
        self.uow
            .tasks()
            .list_by_group_and_statuses(user_group_id, statuses)
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> TaskService for TaskManager<U> {
    async fn get_task(&self, actor_id: i32, task_id: i32) -> AppResult<Task> {
        let user_group_id = actor_group(&self.uow.users(), actor_id).await?;
        owned_task(
            &self.uow.tasks(),
            &self.uow.categories(),
            task_id,
            user_group_id,
        )
        .await
    }

    async fn list_task_board(&self, actor_id: i32) -> AppResult<Vec<Task>> {
        self.list_with_statuses(actor_id, &TaskStatus::BOARD).await
    }

    async fn list_look_back(&self, actor_id: i32) -> AppResult<Vec<Task>> {
        self.list_with_statuses(actor_id, &[TaskStatus::LookBack])
            .await
    }

    async fn create_task(&self, actor_id: i32, input: NewTask) -> AppResult<Task> {
        input.check()?;

        let task = crate::with_transaction!(self.uow, |ctx| {
            let user_group_id = actor_group(&ctx.users(), actor_id).await?;
            owned_category(&ctx.categories(), input.category_id, user_group_id).await?;
            ensure_member(&ctx.users(), input.responsible_user_id, user_group_id).await?;

            ctx.tasks()
                .create(TaskRecord {
                    title: input.title,
                    description: input.description,
                    creator_user_id: actor_id,
                    responsible_user_id: input.responsible_user_id,
                    category_id: input.category_id,
                    status: input.status,
                    estimate: input.estimate,
                    start_date: input.start_date,
                })
                .await
        })?;

        tracing::info!(task_id = task.id, creator_user_id = actor_id, "Task created");
        Ok(task)
    }

    async fn update_task(&self, actor_id: i32, task_id: i32, patch: TaskPatch) -> AppResult<Task> {
        patch.check()?;

        crate::with_transaction!(self.uow, |ctx| {
            let user_group_id = actor_group(&ctx.users(), actor_id).await?;
            let task = owned_task(&ctx.tasks(), &ctx.categories(), task_id, user_group_id).await?;

            if patch.is_empty() {
                return Ok(task);
            }
            if let Some(category_id) = patch.category_id {
                owned_category(&ctx.categories(), category_id, user_group_id).await?;
            }
            if let Some(responsible_user_id) = patch.responsible_user_id {
                ensure_member(&ctx.users(), responsible_user_id, user_group_id).await?;
            }

            ctx.tasks().update(task_id, patch).await
        })
    }

    async fn delete_task(&self, actor_id: i32, task_id: i32) -> AppResult<()> {
        crate::with_transaction!(self.uow, |ctx| {
            let user_group_id = actor_group(&ctx.users(), actor_id).await?;
            owned_task(&ctx.tasks(), &ctx.categories(), task_id, user_group_id).await?;
            ctx.tasks().delete(task_id).await
        })?;

        tracing::info!(task_id, "Task deleted");
        Ok(())
    }
}
