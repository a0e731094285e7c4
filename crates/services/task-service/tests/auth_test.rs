//! Sign up, login and password handling.

mod support;

use std::sync::Arc;

use common::{AppError, JwtConfig};
use domain::{MockPasswordHasher, SignUp};
use task_service_lib::infra::{Persistence, UnitOfWork};
use task_service_lib::service::{
    AuthService, Authenticator, SessionTokens, UserGroupManager, UserGroupService, UserManager,
    UserService,
};

use support::{fast_hasher, group, setup, user};

fn tokens() -> SessionTokens {
    SessionTokens::new(JwtConfig {
        secret: "auth-test-secret-that-is-long-enough".to_string(),
        expiration_hours: 1,
    })
    .unwrap()
}

fn sign_up(group_name: &str, name: &str, email: &str) -> SignUp {
    SignUp {
        group_name: group_name.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
    }
}

fn authenticator(uow: Arc<Persistence>) -> Authenticator<Persistence> {
    Authenticator::new(uow, fast_hasher(), tokens())
}

#[tokio::test]
async fn test_sign_up_then_login() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow.clone());

    let signed_up = auth
        .sign_up(sign_up("Eng", "alice", "alice@example.com"))
        .await
        .unwrap();
    assert!(!signed_up.user.is_guest());

    let group = uow
        .user_groups()
        .find_by_id(signed_up.user.user_group_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.name, "Eng");

    let session = auth
        .login("alice@example.com".to_string(), "password123".to_string())
        .await
        .unwrap();
    assert_eq!(session.user.id, signed_up.user.id);
    assert_eq!(session.token.token_type, "Bearer");

    let header = format!("Bearer {}", session.token.access_token);
    assert_eq!(auth.resolve(&header).await.unwrap(), signed_up.user.id);
}

#[tokio::test]
async fn test_session_json_hides_password_hash() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow);

    let session = auth
        .sign_up(sign_up("Eng", "alice", "alice@example.com"))
        .await
        .unwrap();
    let json = serde_json::to_value(&session).unwrap();

    assert!(json["user"].get("password_hash").is_none());
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert!(json["token"]["access_token"].is_string());
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow);

    auth.sign_up(sign_up("Eng", "alice", "alice@example.com"))
        .await
        .unwrap();

    let wrong = auth
        .login("alice@example.com".to_string(), "password124".to_string())
        .await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

    let unknown = auth
        .login("nobody@example.com".to_string(), "password123".to_string())
        .await;
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_sign_up_with_taken_email_leaves_no_group_behind() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow.clone());

    auth.sign_up(sign_up("Eng", "alice", "alice@example.com"))
        .await
        .unwrap();
    let result = auth
        .sign_up(sign_up("Ops", "alice", "alice@example.com"))
        .await;

    assert!(matches!(result, Err(AppError::Duplicate(_))));
    assert_eq!(uow.user_groups().list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolve_rejects_deleted_user() {
    let (_db, uow) = setup().await;
    let auth = authenticator(uow.clone());

    let session = auth
        .sign_up(sign_up("Eng", "alice", "alice@example.com"))
        .await
        .unwrap();
    UserGroupManager::new(uow.clone())
        .delete_user_group_cascade(session.user.user_group_id)
        .await
        .unwrap();

    let result = auth.resolve(&session.token.access_token).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_update_password_checks_current_password() {
    let (_db, uow) = setup().await;
    let eng = group(&uow, "Eng").await;
    let alice = user(&uow, eng.id, "alice", "alice@example.com").await;

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .times(2)
        .returning(|plain, _| plain == "right-password");
    hasher
        .expect_hash()
        .times(1)
        .returning(|plain| Ok(format!("digest:{}", plain)));

    let service = UserManager::new(uow.clone(), Arc::new(hasher));

    let rejected = service
        .update_password(alice.id, "wrong-password".to_string(), "new-password".to_string())
        .await;
    assert!(matches!(rejected, Err(AppError::InvalidCredentials)));

    let updated = service
        .update_password(alice.id, "right-password".to_string(), "new-password".to_string())
        .await
        .unwrap();
    assert_eq!(updated.password_hash, "digest:new-password");
}

#[tokio::test]
async fn test_password_policy_runs_before_any_lookup() {
    let (_db, uow) = setup().await;

    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().never();
    hasher.expect_hash().never();

    let service = UserManager::new(uow, Arc::new(hasher));
    let err = tokio_test::assert_err!(
        service
            .update_password(1, "whatever1".to_string(), "short".to_string())
            .await
    );

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_group_of_missing_user_is_not_found() {
    let (_db, uow) = setup().await;
    let eng = group(&uow, "Eng").await;
    let alice = user(&uow, eng.id, "alice", "alice@example.com").await;

    let service = UserGroupManager::new(uow);
    assert_eq!(service.group_of_user(alice.id).await.unwrap(), eng.id);
    assert!(matches!(
        service.group_of_user(999).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_list_all_users_spans_groups_in_name_order() {
    let (_db, uow) = setup().await;
    let eng = group(&uow, "Eng").await;
    let ops = group(&uow, "Ops").await;
    user(&uow, eng.id, "carol", "carol@example.com").await;
    user(&uow, ops.id, "alice", "alice@example.com").await;
    user(&uow, eng.id, "bob", "bob@example.com").await;

    let listed = UserManager::new(uow, fast_hasher())
        .list_all_users()
        .await
        .unwrap();

    let names: Vec<&str> = listed.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["alice", "bob", "carol"]);
    assert_eq!(listed[0].user_group_id, ops.id);

    let json = serde_json::to_value(&listed).unwrap();
    assert!(json[0].get("password_hash").is_none());
    assert_eq!(json[0]["email"], "alice@example.com");
}
