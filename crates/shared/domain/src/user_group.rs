//! User group domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::GUEST_USER_GROUP_ID;
use crate::error::DomainResult;

/// A user group owns users and categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserGroup {
    /// Check if this is the shared guest/demo group
    pub fn is_guest(&self) -> bool {
        self.id == GUEST_USER_GROUP_ID
    }
}

/// User group creation / rename input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUserGroup {
    /// Group display name
    #[validate(length(min = 1, max = 30, message = "must be 1 to 30 characters"))]
    pub name: String,
}

impl NewUserGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        Ok(())
    }
}
