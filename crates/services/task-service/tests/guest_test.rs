//! Guest lifecycle: the shared demo group always comes back identical.

mod support;

use std::sync::Arc;

use chrono::Utc;
use common::{AppError, JwtConfig};
use domain::{CategoryInput, NewTask, TaskStatus, GUEST_USER_GROUP_ID};
use task_service_lib::cascade::EntityKind;
use task_service_lib::infra::{Persistence, UnitOfWork};
use task_service_lib::service::{
    AuthService, Authenticator, CategoryManager, CategoryService, GuestLifecycle, GuestManager,
    SessionTokens, TaskManager, TaskService, UserManager, UserService,
};

use support::{fast_hasher, setup};

fn authenticator(uow: Arc<Persistence>) -> Authenticator<Persistence> {
    let tokens = SessionTokens::new(JwtConfig {
        secret: "guest-test-secret-long-enough-for-hs256".to_string(),
        expiration_hours: 1,
    })
    .unwrap();
    Authenticator::new(uow, fast_hasher(), tokens)
}

/// (users, categories, tasks) under the guest group
async fn guest_counts(uow: &Persistence) -> (usize, usize, usize) {
    (
        uow.users().list_by_group(GUEST_USER_GROUP_ID).await.unwrap().len(),
        uow.categories()
            .list_by_group(GUEST_USER_GROUP_ID)
            .await
            .unwrap()
            .len(),
        uow.tasks().list_by_group(GUEST_USER_GROUP_ID).await.unwrap().len(),
    )
}

#[tokio::test]
async fn test_teardown_without_guest_group_is_success() {
    let (_db, uow) = setup().await;

    let report = GuestManager::new(uow, fast_hasher()).teardown().await.unwrap();
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn test_bootstrap_seeds_fixtures() {
    let (_db, uow) = setup().await;

    let first = GuestManager::new(uow.clone(), fast_hasher())
        .bootstrap()
        .await
        .unwrap();

    assert_eq!(first.name, "Taro Yamada");
    assert!(first.is_guest());
    assert_eq!(guest_counts(&uow).await, (3, 2, 5));

    let group = uow
        .user_groups()
        .find_by_id(GUEST_USER_GROUP_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.name, "Development");

    let tasks = uow.tasks().list_by_group(GUEST_USER_GROUP_ID).await.unwrap();
    let look_back = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::LookBack)
        .count();
    assert_eq!(look_back, 2);
}

#[tokio::test]
async fn test_second_bootstrap_without_teardown_conflicts() {
    let (_db, uow) = setup().await;
    let guests = GuestManager::new(uow.clone(), fast_hasher());

    guests.bootstrap().await.unwrap();
    let result = guests.bootstrap().await;

    assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    assert_eq!(guest_counts(&uow).await, (3, 2, 5));
}

#[tokio::test]
async fn test_guest_login_is_idempotent_across_mutations() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow.clone());

    let session = auth.guest_login().await.unwrap();
    assert_eq!(guest_counts(&uow).await, (3, 2, 5));

    // Mess with the demo data the way a guest would
    let actor = session.user.id;
    let categories = CategoryManager::new(uow.clone());
    let tasks = TaskManager::new(uow.clone());

    let scratch = categories
        .create_category(actor, CategoryInput::new("Scratch"))
        .await
        .unwrap();
    tasks
        .create_task(
            actor,
            NewTask {
                title: "Extra".to_string(),
                description: String::new(),
                responsible_user_id: actor,
                category_id: scratch.id,
                status: TaskStatus::InProgress,
                estimate: None,
                start_date: Utc::now(),
            },
        )
        .await
        .unwrap();
    let board = tasks.list_task_board(actor).await.unwrap();
    tasks.delete_task(actor, board[0].id).await.unwrap();
    assert_ne!(guest_counts(&uow).await, (3, 2, 5));

    for _ in 0..2 {
        auth.guest_login().await.unwrap();
        assert_eq!(guest_counts(&uow).await, (3, 2, 5));
    }
}

#[tokio::test]
async fn test_guest_token_dies_with_the_reset() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow.clone());

    let first = auth.guest_login().await.unwrap();
    assert_eq!(
        auth.resolve(&first.token.access_token).await.unwrap(),
        first.user.id
    );

    let second = auth.guest_login().await.unwrap();
    assert_ne!(first.user.id, second.user.id);

    let stale = auth.resolve(&first.token.access_token).await;
    assert!(matches!(stale, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_teardown_report_counts_seeded_rows() {
    let (_db, uow) = setup().await;
    let guests = GuestManager::new(uow.clone(), fast_hasher());

    guests.bootstrap().await.unwrap();
    let report = guests.teardown().await.unwrap();

    assert_eq!(report.deleted(EntityKind::UserGroup), 1);
    assert_eq!(report.deleted(EntityKind::User), 3);
    assert_eq!(report.deleted(EntityKind::Category), 2);
    assert_eq!(report.deleted(EntityKind::Task), 5);
    assert_eq!(guest_counts(&uow).await, (0, 0, 0));
}

#[tokio::test]
async fn test_guest_cannot_leave_the_guest_group() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow.clone());
    let eng = support::group(&uow, "Eng").await;

    let session = auth.guest_login().await.unwrap();
    let users = UserManager::new(uow.clone(), fast_hasher());

    let moved = users.update_user_group(session.user.id, eng.id).await;
    assert!(matches!(moved, Err(AppError::Validation(_))));
    assert!(uow.users().list_by_group(eng.id).await.unwrap().is_empty());

    // The next reset still finds every seeded account under the sentinel
    tokio_test::assert_ok!(auth.guest_login().await);
    assert_eq!(guest_counts(&uow).await, (3, 2, 5));
}
