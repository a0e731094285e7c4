//! Scoped uniqueness: guard errors first, schema indexes as the backstop.

mod support;

use common::AppError;
use domain::{CategoryInput, CreateUser, EmailInput, GUEST_USER_GROUP_ID};
use task_service_lib::infra::UnitOfWork;
use task_service_lib::repository::UserRecord;
use task_service_lib::service::{CategoryManager, CategoryService, UserManager, UserService};

use support::{category, fast_hasher, group, setup, user};

fn create_user(group_id: i32, name: &str, email: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        user_group_id: group_id,
    }
}

#[tokio::test]
async fn test_user_name_unique_per_group() {
    let (_db, uow) = setup().await;
    let service = UserManager::new(uow.clone(), fast_hasher());

    let a = group(&uow, "A").await;
    let b = group(&uow, "B").await;

    service
        .create_user(create_user(a.id, "bob", "bob@a.example.com"))
        .await
        .unwrap();

    let again = service
        .create_user(create_user(a.id, "bob", "bob2@a.example.com"))
        .await;
    assert!(matches!(again, Err(AppError::Duplicate(_))));

    let other_group = service
        .create_user(create_user(b.id, "bob", "bob@b.example.com"))
        .await
        .unwrap();
    assert_eq!(other_group.user_group_id, b.id);

    assert_eq!(uow.users().list_by_group(a.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_email_unique_across_groups() {
    let (_db, uow) = setup().await;
    let service = UserManager::new(uow.clone(), fast_hasher());

    let a = group(&uow, "A").await;
    let b = group(&uow, "B").await;

    service
        .create_user(create_user(a.id, "bob", "bob@example.com"))
        .await
        .unwrap();

    let result = service
        .create_user(create_user(b.id, "robert", "bob@example.com"))
        .await;
    assert!(matches!(result, Err(AppError::Duplicate(_))));
}

#[tokio::test]
async fn test_update_email_keeps_own_address() {
    let (_db, uow) = setup().await;
    let service = UserManager::new(uow.clone(), fast_hasher());

    let a = group(&uow, "A").await;
    let bob = user(&uow, a.id, "bob", "bob@example.com").await;
    user(&uow, a.id, "carol", "carol@example.com").await;

    let same = service
        .update_email(bob.id, EmailInput { email: "bob@example.com".to_string() })
        .await
        .unwrap();
    assert_eq!(same.email, "bob@example.com");

    let taken = service
        .update_email(bob.id, EmailInput { email: "carol@example.com".to_string() })
        .await;
    assert!(matches!(taken, Err(AppError::Duplicate(_))));
}

#[tokio::test]
async fn test_rename_and_move_respect_scoped_names() {
    let (_db, uow) = setup().await;
    let service = UserManager::new(uow.clone(), fast_hasher());

    let a = group(&uow, "A").await;
    let b = group(&uow, "B").await;
    let bob = user(&uow, a.id, "bob", "bob@example.com").await;
    user(&uow, a.id, "carol", "carol@example.com").await;
    user(&uow, b.id, "bob", "bob@b.example.com").await;

    let rename = service.update_username(bob.id, "carol".to_string()).await;
    assert!(matches!(rename, Err(AppError::Duplicate(_))));

    let moved = service.update_user_group(bob.id, b.id).await;
    assert!(matches!(moved, Err(AppError::Duplicate(_))));

    let renamed = tokio_test::assert_ok!(service.update_username(bob.id, "robert".to_string()).await);
    let moved = service.update_user_group(renamed.id, b.id).await.unwrap();
    assert_eq!(moved.user_group_id, b.id);
}

#[tokio::test]
async fn test_guest_group_is_reserved() {
    let (_db, uow) = setup().await;
    let service = UserManager::new(uow.clone(), fast_hasher());

    let a = group(&uow, "A").await;
    let bob = user(&uow, a.id, "bob", "bob@example.com").await;

    let create = service
        .create_user(create_user(GUEST_USER_GROUP_ID, "eve", "eve@example.com"))
        .await;
    assert!(matches!(create, Err(AppError::Validation(_))));

    let guest_mail = service
        .create_user(create_user(a.id, "eve", "eve@guest.lookback.invalid"))
        .await;
    assert!(matches!(guest_mail, Err(AppError::Validation(_))));

    let moved = service.update_user_group(bob.id, GUEST_USER_GROUP_ID).await;
    assert!(matches!(moved, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let (_db, uow) = setup().await;
    let service = UserManager::new(uow.clone(), fast_hasher());

    let result = service
        .create_user(create_user(99, "bob", "bob@example.com"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_category_name_unique_per_group() {
    let (_db, uow) = setup().await;
    let service = CategoryManager::new(uow.clone());

    let a = group(&uow, "A").await;
    let b = group(&uow, "B").await;
    let alice = user(&uow, a.id, "alice", "alice@example.com").await;
    let carol = user(&uow, b.id, "carol", "carol@example.com").await;

    service
        .create_category(alice.id, CategoryInput::new("Bugs"))
        .await
        .unwrap();
    let again = service
        .create_category(alice.id, CategoryInput::new("Bugs"))
        .await;
    assert!(matches!(again, Err(AppError::Duplicate(_))));

    service
        .create_category(carol.id, CategoryInput::new("Bugs"))
        .await
        .unwrap();

    let features = category(&uow, a.id, "Features").await;
    let clash = service
        .update_category(alice.id, features.id, CategoryInput::new("Bugs"))
        .await;
    assert!(matches!(clash, Err(AppError::Duplicate(_))));

    // Keeping its own name is fine
    tokio_test::assert_ok!(
        service
            .update_category(alice.id, features.id, CategoryInput::new("Features"))
            .await
    );
}

#[tokio::test]
async fn test_schema_rejects_duplicates_that_skip_the_guard() {
    let (_db, uow) = setup().await;

    let a = group(&uow, "A").await;
    user(&uow, a.id, "bob", "bob@example.com").await;

    let same_email = uow
        .users()
        .create(UserRecord {
            name: "robert".to_string(),
            email: "bob@example.com".to_string(),
            password_hash: "x".to_string(),
            user_group_id: a.id,
        })
        .await;
    assert!(matches!(same_email, Err(AppError::ConstraintViolation(_))));

    let same_name = uow
        .users()
        .create(UserRecord {
            name: "bob".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "x".to_string(),
            user_group_id: a.id,
        })
        .await;
    assert!(matches!(same_name, Err(AppError::ConstraintViolation(_))));

    category(&uow, a.id, "Bugs").await;
    let same_category = uow.categories().create(a.id, "Bugs".to_string()).await;
    assert!(matches!(same_category, Err(AppError::ConstraintViolation(_))));
}
