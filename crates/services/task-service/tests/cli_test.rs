//! Operator commands against a throwaway database.

use common::{AppError, DatabaseConfig};
use task_service_lib::config::TaskServiceConfig;
use task_service_lib::{run_migrations, run_ping, run_purge, MigrateAction, PurgeTarget};

fn sqlite_config() -> TaskServiceConfig {
    TaskServiceConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            sql_logging: false,
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ping_and_migrate_up() {
    let config = sqlite_config();

    tokio_test::assert_ok!(run_ping(&config).await);
    tokio_test::assert_ok!(run_migrations(&config, MigrateAction::Up).await);
}

#[tokio::test]
async fn test_purge_of_missing_group_is_not_found() {
    let config = sqlite_config();

    let err = tokio_test::assert_err!(run_purge(&config, PurgeTarget::UserGroup, 42).await);
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::NotFound)));
}
