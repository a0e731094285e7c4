//! Shared fixtures for the integration tests: an in-memory SQLite database
//! with every migration applied, plus shortcuts for building hierarchies.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use common::DatabaseConfig;
use domain::{Argon2Hasher, Category, PasswordHasher, Task, TaskStatus, User, UserGroup};
use task_service_lib::infra::{Database, Persistence, UnitOfWork};
use task_service_lib::repository::entities::{category, task, user, user_group};
use task_service_lib::repository::{TaskRecord, UserRecord};

/// One pooled connection keeps the in-memory database alive for the test.
pub async fn connect() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        sql_logging: false,
    };

    Database::connect(&config)
        .await
        .expect("in-memory database")
        .get_connection()
}

/// Raw connection for assertions plus a Unit of Work sharing its pool.
pub async fn setup() -> (DatabaseConnection, Arc<Persistence>) {
    let db = connect().await;
    let uow = Arc::new(Persistence::new(db.clone()));
    (db, uow)
}

/// Argon2 with minimal costs so tests stay fast.
pub fn fast_hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2Hasher::with_costs(8, 1, 1).expect("valid argon2 costs"))
}

pub async fn group(uow: &Persistence, name: &str) -> UserGroup {
    uow.user_groups().create(name.to_string()).await.unwrap()
}

pub async fn user(uow: &Persistence, user_group_id: i32, name: &str, email: &str) -> User {
    uow.users()
        .create(UserRecord {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-digest".to_string(),
            user_group_id,
        })
        .await
        .unwrap()
}

pub async fn category(uow: &Persistence, user_group_id: i32, name: &str) -> Category {
    uow.categories()
        .create(user_group_id, name.to_string())
        .await
        .unwrap()
}

pub async fn task(
    uow: &Persistence,
    title: &str,
    creator: &User,
    responsible: &User,
    category: &Category,
    status: TaskStatus,
) -> Task {
    uow.tasks()
        .create(TaskRecord {
            title: title.to_string(),
            description: String::new(),
            creator_user_id: creator.id,
            responsible_user_id: responsible.id,
            category_id: category.id,
            status,
            estimate: Some(1),
            start_date: Utc::now(),
        })
        .await
        .unwrap()
}

/// Row counts as (user_groups, users, categories, tasks).
pub async fn counts(db: &DatabaseConnection) -> (u64, u64, u64, u64) {
    (
        user_group::Entity::find().count(db).await.unwrap(),
        user::Entity::find().count(db).await.unwrap(),
        category::Entity::find().count(db).await.unwrap(),
        task::Entity::find().count(db).await.unwrap(),
    )
}
