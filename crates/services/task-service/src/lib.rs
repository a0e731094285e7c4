//! Task Service Library
//!
//! Task board core: user groups own users and categories, tasks live in a
//! category. Deletion always cascades through the ownership graph inside a
//! single transaction; the shared guest group is rebuilt on every guest login.

pub mod cascade;
pub mod config;
pub mod guard;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use domain::Argon2Hasher;
use tracing::info;

use crate::cascade::EntityKind;
use crate::config::TaskServiceConfig;
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::service::{reset_guest_group, GuestManager};

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &TaskServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Rebuild the guest group from its seed fixtures.
pub async fn run_guest_reset(
    config: &TaskServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let guests = GuestManager::new(uow, Arc::new(Argon2Hasher::new()));

    let user = reset_guest_group(&guests).await?;
    println!("Guest group ready, login user #{} <{}>", user.id, user.email);

    Ok(())
}

/// Root of an operator-triggered cascade.
#[derive(Debug, Clone, Copy)]
pub enum PurgeTarget {
    UserGroup,
    Category,
}

impl From<PurgeTarget> for EntityKind {
    fn from(target: PurgeTarget) -> Self {
        match target {
            PurgeTarget::UserGroup => EntityKind::UserGroup,
            PurgeTarget::Category => EntityKind::Category,
        }
    }
}

/// Cascade-delete one row and everything that depends on it.
pub async fn run_purge(
    config: &TaskServiceConfig,
    target: PurgeTarget,
    id: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;
    let uow = Persistence::new(db.get_connection());

    let kind = EntityKind::from(target);
    let report = crate::with_transaction!(uow, |ctx| { ctx.cascade().delete(kind, id).await })?;

    info!(%report, "Purge committed");
    println!("{}", report);

    Ok(())
}

/// Check that the database answers.
pub async fn run_ping(config: &TaskServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    db.ping().await?;
    println!("Database reachable");

    Ok(())
}
