//! Authentication service - sign up, login, guest login and token resolution.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{PasswordHasher, SignUp, User};

use super::guest_service::{reset_guest_group, GuestManager};
use super::session::{IdentityResolver, SessionTokens, TokenResponse};
use crate::infra::UnitOfWork;
use crate::repository::UserRecord;

/// Verified against when the email is unknown, so both paths hash once.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

/// Authenticated user plus its session token
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: TokenResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a new group and its first user in one transaction
    async fn sign_up(&self, input: SignUp) -> AppResult<AuthSession>;

    /// Login with email and password
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Reset the shared guest group and log in as its first user
    async fn guest_login(&self) -> AppResult<AuthSession>;

    /// Map a token (or `Authorization` header value) to an existing user id
    async fn resolve(&self, credential: &str) -> AppResult<i32>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: SessionTokens,
    guests: GuestManager<U>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, hasher: Arc<dyn PasswordHasher>, tokens: SessionTokens) -> Self {
        let guests = GuestManager::new(uow.clone(), hasher.clone());
        Self {
            uow,
            hasher,
            tokens,
            guests,
        }
    }

    fn session(&self, user: User) -> AppResult<AuthSession> {
        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn sign_up(&self, input: SignUp) -> AppResult<AuthSession> {
        input.check()?;
        let password_hash = self.hasher.hash(&input.password)?;

        let user = crate::with_transaction!(self.uow, |ctx| {
            ctx.guard().email_available(&input.email, None).await?;

            let group = ctx.user_groups().create(input.group_name).await?;
            ctx.users()
                .create(UserRecord {
                    name: input.name,
                    email: input.email,
                    password_hash,
                    user_group_id: group.id,
                })
                .await
        })?;

        tracing::info!(user_id = user.id, user_group_id = user.user_group_id, "Signed up");
        self.session(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let found = self.uow.users().find_by_email(&email).await?;

        // Verify even for unknown emails so timing does not reveal them
        let digest = found
            .as_ref()
            .map(|user| user.password_hash.as_str())
            .unwrap_or(DUMMY_HASH);
        let password_valid = self.hasher.verify(&password, digest);

        match found {
            Some(user) if password_valid => {
                tracing::info!(user_id = user.id, "Logged in");
                self.session(user)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn guest_login(&self) -> AppResult<AuthSession> {
        let user = reset_guest_group(&self.guests).await?;
        self.session(user)
    }

    async fn resolve(&self, credential: &str) -> AppResult<i32> {
        let user_id = self.tokens.resolve(credential)?;

        // A guest reset or a cascade may have removed the user since issue
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .map(|user| user.id)
            .ok_or(AppError::Unauthorized)
    }
}
