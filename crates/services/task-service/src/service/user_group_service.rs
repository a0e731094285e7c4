//! User group service - group lifecycle including the full cascade.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppResult, OptionExt};
use domain::{NewUserGroup, UserGroup};

use crate::cascade::{CascadeReport, EntityKind};
use crate::infra::UnitOfWork;

/// User group service trait for dependency injection.
#[async_trait]
pub trait UserGroupService: Send + Sync {
    async fn create_user_group(&self, input: NewUserGroup) -> AppResult<UserGroup>;

    async fn get_user_group(&self, id: i32) -> AppResult<UserGroup>;

    /// All groups ordered by name
    async fn list_user_groups(&self) -> AppResult<Vec<UserGroup>>;

    async fn update_user_group_name(&self, id: i32, input: NewUserGroup) -> AppResult<UserGroup>;

    /// Group of a user. A missing user is `NotFound`, never a zero id.
    async fn group_of_user(&self, user_id: i32) -> AppResult<i32>;

    /// Delete the group with all its users, categories and tasks
    async fn delete_user_group_cascade(&self, id: i32) -> AppResult<CascadeReport>;
}

/// Concrete implementation of UserGroupService using Unit of Work.
pub struct UserGroupManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserGroupManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserGroupService for UserGroupManager<U> {
    async fn create_user_group(&self, input: NewUserGroup) -> AppResult<UserGroup> {
        input.check()?;
        let group = self.uow.user_groups().create(input.name).await?;
        tracing::info!(user_group_id = group.id, "User group created");
        Ok(group)
    }

    async fn get_user_group(&self, id: i32) -> AppResult<UserGroup> {
        self.uow.user_groups().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_user_groups(&self) -> AppResult<Vec<UserGroup>> {
        self.uow.user_groups().list_all().await
    }

    async fn update_user_group_name(&self, id: i32, input: NewUserGroup) -> AppResult<UserGroup> {
        input.check()?;
        self.uow.user_groups().update_name(id, input.name).await
    }

    async fn group_of_user(&self, user_id: i32) -> AppResult<i32> {
        self.uow.users().group_of(user_id).await?.ok_or_not_found()
    }

    async fn delete_user_group_cascade(&self, id: i32) -> AppResult<CascadeReport> {
        let report = crate::with_transaction!(self.uow, |ctx| {
            ctx.cascade().delete(EntityKind::UserGroup, id).await
        })?;

        tracing::info!(%report, "User group deleted");
        Ok(report)
    }
}
