//! Category domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainResult;

/// A category groups tasks inside one user group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub user_group_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Check if the category belongs to the given group
    pub fn is_owned_by(&self, user_group_id: i32) -> bool {
        self.user_group_id == user_group_id
    }
}

/// Category name input (create and rename)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    /// Category name, unique within the group
    #[validate(length(min = 1, max = 30, message = "must be 1 to 30 characters"))]
    pub name: String,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        Ok(())
    }
}
