//! Guest lifecycle - teardown and bootstrap of the shared demo group.
//!
//! The demo hierarchy lives under the sentinel group id. Every guest login
//! wipes it with the tolerant cascade and seeds it again, so the group always
//! starts from the same fixtures. Teardown and bootstrap are two separate
//! transactions; a failed teardown stops before anything is seeded.
//!
//! Two guest logins racing on the sentinel id are not serialized. The loser's
//! bootstrap hits the primary key and surfaces as `ConstraintViolation`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::guest::{GUEST_CATEGORIES, GUEST_GROUP_NAME, GUEST_TASKS, GUEST_USERS};
use domain::{PasswordHasher, User, GUEST_USER_GROUP_ID};

use crate::cascade::{CascadeReport, EntityKind};
use crate::infra::UnitOfWork;
use crate::repository::{TaskRecord, UserRecord};

#[cfg(test)]
use mockall::automock;

/// Guest lifecycle trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GuestLifecycle: Send + Sync {
    /// Remove the guest group and everything under it. Nothing to delete is success.
    async fn teardown(&self) -> AppResult<CascadeReport>;

    /// Seed the guest group; returns the user a guest logs in as.
    async fn bootstrap(&self) -> AppResult<User>;
}

/// Teardown then bootstrap. A failed teardown is returned as is and
/// nothing gets seeded.
pub async fn reset_guest_group<G>(guests: &G) -> AppResult<User>
where
    G: GuestLifecycle + ?Sized,
{
    guests.teardown().await?;
    guests.bootstrap().await
}

/// Concrete implementation of GuestLifecycle using Unit of Work.
pub struct GuestManager<U: UnitOfWork> {
    uow: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<U: UnitOfWork> GuestManager<U> {
    pub fn new(uow: Arc<U>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { uow, hasher }
    }

    fn seed_users(&self) -> AppResult<Vec<UserRecord>> {
        GUEST_USERS
            .iter()
            .map(|seed| {
                Ok(UserRecord {
                    name: seed.name.to_string(),
                    email: seed.email.to_string(),
                    password_hash: self.hasher.hash(seed.password)?,
                    user_group_id: GUEST_USER_GROUP_ID,
                })
            })
            .collect()
    }
}

/// Resolve a seed position against the ids the database assigned.
fn seeded_id(ids: &HashMap<&str, i32>, key: &str) -> AppResult<i32> {
    ids.get(key)
        .copied()
        .ok_or_else(|| AppError::internal(format!("Guest seed row '{}' was not inserted", key)))
}

fn seed_tasks(
    user_ids: &HashMap<&str, i32>,
    category_ids: &HashMap<&str, i32>,
    now: DateTime<Utc>,
) -> AppResult<Vec<TaskRecord>> {
    GUEST_TASKS
        .iter()
        .map(|seed| {
            Ok(TaskRecord {
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                creator_user_id: seeded_id(user_ids, GUEST_USERS[seed.creator].email)?,
                responsible_user_id: seeded_id(user_ids, GUEST_USERS[seed.responsible].email)?,
                category_id: seeded_id(category_ids, GUEST_CATEGORIES[seed.category])?,
                status: seed.status,
                estimate: Some(seed.estimate),
                start_date: seed.start.resolve(now),
            })
        })
        .collect()
}

#[async_trait]
impl<U: UnitOfWork> GuestLifecycle for GuestManager<U> {
    async fn teardown(&self) -> AppResult<CascadeReport> {
        let report = crate::with_transaction!(self.uow, |ctx| {
            ctx.cascade()
                .purge(EntityKind::UserGroup, GUEST_USER_GROUP_ID)
                .await
        })?;

        tracing::info!(%report, "Guest group torn down");
        Ok(report)
    }

    async fn bootstrap(&self) -> AppResult<User> {
        // Hashing is slow; keep it out of the transaction
        let users = self.seed_users()?;
        let now = Utc::now();

        let user = crate::with_transaction!(self.uow, |ctx| {
            ctx.user_groups()
                .create_with_id(GUEST_USER_GROUP_ID, GUEST_GROUP_NAME.to_string())
                .await?;

            ctx.users().insert_many(users).await?;
            ctx.categories()
                .insert_many(
                    GUEST_USER_GROUP_ID,
                    GUEST_CATEGORIES.iter().map(|name| name.to_string()).collect(),
                )
                .await?;

            let users = ctx.users().list_by_group(GUEST_USER_GROUP_ID).await?;
            let categories = ctx.categories().list_by_group(GUEST_USER_GROUP_ID).await?;

            let user_ids: HashMap<&str, i32> =
                users.iter().map(|u| (u.email.as_str(), u.id)).collect();
            let category_ids: HashMap<&str, i32> =
                categories.iter().map(|c| (c.name.as_str(), c.id)).collect();

            ctx.tasks()
                .insert_many(seed_tasks(&user_ids, &category_ids, now)?)
                .await?;

            let first = GUEST_USERS[0].email;
            users
                .into_iter()
                .find(|u| u.email == first)
                .ok_or_else(|| AppError::internal("Guest login user was not seeded"))
        })?;

        tracing::info!(
            user_id = user.id,
            users = GUEST_USERS.len(),
            categories = GUEST_CATEGORIES.len(),
            tasks = GUEST_TASKS.len(),
            "Guest group seeded"
        );
        Ok(user)
    }
}
