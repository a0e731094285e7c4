//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{is_guest_email, GUEST_USER_GROUP_ID, MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use crate::error::{DomainError, DomainResult};

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub user_group_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user belongs to the shared guest group
    pub fn is_guest(&self) -> bool {
        self.user_group_id == GUEST_USER_GROUP_ID
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    /// Display name, unique within the group
    #[validate(length(min = 1, max = 30, message = "must be 1 to 30 characters"))]
    pub name: String,
    /// Email address, unique system-wide
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Plain text password (hashed before storage)
    #[validate(length(min = 8, max = 255, message = "must be 8 to 255 characters"))]
    pub password: String,
    /// Owning group
    pub user_group_id: i32,
}

impl CreateUser {
    /// Run field rules plus the ordinary-account restrictions.
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        check_ordinary_group(self.user_group_id)?;
        check_ordinary_email(&self.email)
    }
}

/// Self-service registration: a new group and its first user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUp {
    #[validate(length(min = 1, max = 30, message = "must be 1 to 30 characters"))]
    pub group_name: String,
    #[validate(length(min = 1, max = 30, message = "must be 1 to 30 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 255, message = "must be 8 to 255 characters"))]
    pub password: String,
}

impl SignUp {
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        check_ordinary_email(&self.email)
    }
}

/// Email change input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

impl EmailInput {
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        check_ordinary_email(&self.email)
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub user_group_id: i32,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            user_group_id: user.user_group_id,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            user_group_id: user.user_group_id,
        }
    }
}

/// Check a standalone name (user, group or category) against the length rule.
pub fn check_name(field: &str, name: &str) -> DomainResult<()> {
    let len = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        return Err(DomainError::validation(format!(
            "{}: must be {} to {} characters",
            field, MIN_NAME_LENGTH, MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Ordinary accounts may never join the guest group.
pub fn check_ordinary_group(user_group_id: i32) -> DomainResult<()> {
    if user_group_id == GUEST_USER_GROUP_ID {
        return Err(DomainError::validation(
            "user_group_id: the guest user group is reserved",
        ));
    }
    Ok(())
}

fn check_ordinary_email(email: &str) -> DomainResult<()> {
    if is_guest_email(email) {
        return Err(DomainError::validation(
            "email: this mail domain is reserved for guest accounts",
        ));
    }
    Ok(())
}
