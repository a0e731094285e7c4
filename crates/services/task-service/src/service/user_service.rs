//! User service - Handles user-related business logic.
//!
//! Every write runs the uniqueness guard inside the same transaction as
//! the write itself.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{
    check_name, check_ordinary_group, check_password_policy, CreateUser, EmailInput,
    PasswordHasher, User, UserResponse,
};

use crate::cascade::{CascadeReport, EntityKind};
use crate::infra::UnitOfWork;
use crate::repository::{UserChanges, UserRecord};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// Users of one group, ordered by name
    async fn list_users(&self, user_group_id: i32) -> AppResult<Vec<User>>;

    /// Create a user in an existing, ordinary group
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    async fn update_username(&self, id: i32, name: String) -> AppResult<User>;

    async fn update_email(&self, id: i32, input: EmailInput) -> AppResult<User>;

    /// Replace the password after checking the current one
    async fn update_password(&self, id: i32, current: String, new_password: String) -> AppResult<User>;

    /// Move a user to another group
    async fn update_user_group(&self, id: i32, user_group_id: i32) -> AppResult<User>;

    /// Every user in the system, ordered by name, without password digests
    async fn list_all_users(&self) -> AppResult<Vec<UserResponse>>;

    /// Delete the user together with every task it created or is responsible for
    async fn delete_user_cascade(&self, id: i32) -> AppResult<CascadeReport>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { uow, hasher }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self, user_group_id: i32) -> AppResult<Vec<User>> {
        self.uow.users().list_by_group(user_group_id).await
    }

    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        input.check()?;
        let password_hash = self.hasher.hash(&input.password)?;

        let user = crate::with_transaction!(self.uow, |ctx| {
            ctx.user_groups()
                .find_by_id(input.user_group_id)
                .await?
                .ok_or_not_found()?;

            let guard = ctx.guard();
            guard.email_available(&input.email, None).await?;
            guard
                .user_name_available(input.user_group_id, &input.name, None)
                .await?;

            ctx.users()
                .create(UserRecord {
                    name: input.name,
                    email: input.email,
                    password_hash,
                    user_group_id: input.user_group_id,
                })
                .await
        })?;

        tracing::info!(user_id = user.id, user_group_id = user.user_group_id, "User created");
        Ok(user)
    }

    async fn update_username(&self, id: i32, name: String) -> AppResult<User> {
        check_name("name", &name)?;

        crate::with_transaction!(self.uow, |ctx| {
            let user = ctx.users().find_by_id(id).await?.ok_or_not_found()?;
            ctx.guard()
                .user_name_available(user.user_group_id, &name, Some(id))
                .await?;

            ctx.users()
                .update(
                    id,
                    UserChanges {
                        name: Some(name),
                        ..Default::default()
                    },
                )
                .await
        })
    }

    async fn update_email(&self, id: i32, input: EmailInput) -> AppResult<User> {
        input.check()?;

        crate::with_transaction!(self.uow, |ctx| {
            ctx.users().find_by_id(id).await?.ok_or_not_found()?;
            ctx.guard().email_available(&input.email, Some(id)).await?;

            ctx.users()
                .update(
                    id,
                    UserChanges {
                        email: Some(input.email),
                        ..Default::default()
                    },
                )
                .await
        })
    }

    async fn update_password(&self, id: i32, current: String, new_password: String) -> AppResult<User> {
        check_password_policy(&new_password)?;

        let user = self.get_user(id).await?;
        if !self.hasher.verify(&current, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }
        let password_hash = self.hasher.hash(&new_password)?;

        let user = self
            .uow
            .users()
            .update(
                id,
                UserChanges {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = id, "Password changed");
        Ok(user)
    }

    async fn update_user_group(&self, id: i32, user_group_id: i32) -> AppResult<User> {
        check_ordinary_group(user_group_id)?;

        crate::with_transaction!(self.uow, |ctx| {
            let user = ctx.users().find_by_id(id).await?.ok_or_not_found()?;
            // Guest accounts must stay under the sentinel or the next teardown misses them
            if user.is_guest() {
                return Err(AppError::validation(
                    "user_group_id: guest accounts cannot change group",
                ));
            }
            ctx.user_groups()
                .find_by_id(user_group_id)
                .await?
                .ok_or_not_found()?;
            ctx.guard()
                .user_name_available(user_group_id, &user.name, Some(id))
                .await?;

            ctx.users()
                .update(
                    id,
                    UserChanges {
                        user_group_id: Some(user_group_id),
                        ..Default::default()
                    },
                )
                .await
        })
    }

    async fn list_all_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.uow.users().list_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn delete_user_cascade(&self, id: i32) -> AppResult<CascadeReport> {
        let report = crate::with_transaction!(self.uow, |ctx| {
            ctx.cascade().delete(EntityKind::User, id).await
        })?;

        tracing::info!(%report, "User deleted");
        Ok(report)
    }
}
