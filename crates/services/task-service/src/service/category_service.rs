//! Category service - categories of the acting user's group.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{Category, CategoryInput};
use sea_orm::ConnectionTrait;

use crate::cascade::{CascadeReport, EntityKind};
use crate::infra::UnitOfWork;
use crate::repository::{CategoryStore, UserStore};

/// Group of the acting user. An unknown actor is not authenticated.
pub(crate) async fn actor_group<C: ConnectionTrait>(
    users: &UserStore<'_, C>,
    actor_id: i32,
) -> AppResult<i32> {
    users.group_of(actor_id).await?.ok_or(AppError::Unauthorized)
}

/// Load a category and make sure it belongs to the group.
pub(crate) async fn owned_category<C: ConnectionTrait>(
    categories: &CategoryStore<'_, C>,
    category_id: i32,
    user_group_id: i32,
) -> AppResult<Category> {
    let category = categories.find_by_id(category_id).await?.ok_or_not_found()?;
    if !category.is_owned_by(user_group_id) {
        return Err(AppError::Forbidden);
    }
    Ok(category)
}

/// Category service trait for dependency injection.
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Categories of the actor's group, ordered by name
    async fn list_categories(&self, actor_id: i32) -> AppResult<Vec<Category>>;

    async fn create_category(&self, actor_id: i32, input: CategoryInput) -> AppResult<Category>;

    async fn update_category(
        &self,
        actor_id: i32,
        category_id: i32,
        input: CategoryInput,
    ) -> AppResult<Category>;

    /// Delete the category and all of its tasks
    async fn delete_category_cascade(&self, actor_id: i32, category_id: i32) -> AppResult<CascadeReport>;
}

/// Concrete implementation of CategoryService using Unit of Work.
pub struct CategoryManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CategoryManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryManager<U> {
    async fn list_categories(&self, actor_id: i32) -> AppResult<Vec<Category>> {
        let user_group_id = actor_group(&self.uow.users(), actor_id).await?;
        self.uow.categories().list_by_group(user_group_id).await
    }

    async fn create_category(&self, actor_id: i32, input: CategoryInput) -> AppResult<Category> {
        input.check()?;

        let category = crate::with_transaction!(self.uow, |ctx| {
            let user_group_id = actor_group(&ctx.users(), actor_id).await?;
            ctx.guard()
                .category_name_available(user_group_id, &input.name, None)
                .await?;
            ctx.categories().create(user_group_id, input.name).await
        })?;

        tracing::info!(category_id = category.id, "Category created");
        Ok(category)
    }

    async fn update_category(
        &self,
        actor_id: i32,
        category_id: i32,
        input: CategoryInput,
    ) -> AppResult<Category> {
        input.check()?;

        crate::with_transaction!(self.uow, |ctx| {
            let user_group_id = actor_group(&ctx.users(), actor_id).await?;
            owned_category(&ctx.categories(), category_id, user_group_id).await?;
            ctx.guard()
                .category_name_available(user_group_id, &input.name, Some(category_id))
                .await?;
            ctx.categories().update_name(category_id, input.name).await
        })
    }

    async fn delete_category_cascade(&self, actor_id: i32, category_id: i32) -> AppResult<CascadeReport> {
        let report = crate::with_transaction!(self.uow, |ctx| {
            let user_group_id = actor_group(&ctx.users(), actor_id).await?;
            owned_category(&ctx.categories(), category_id, user_group_id).await?;
            ctx.cascade().delete(EntityKind::Category, category_id).await
        })?;

        tracing::info!(%report, "Category deleted");
        Ok(report)
    }
}
