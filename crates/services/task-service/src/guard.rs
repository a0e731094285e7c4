//! Uniqueness guard.
//!
//! A pre-flight probe for the scoped unique keys (email system-wide, user
//! and category names per group). It turns the common conflict into a
//! readable `Duplicate` error. Two concurrent writers can both pass the
//! probe; the unique indexes then reject the loser with
//! `ConstraintViolation`.

use sea_orm::ConnectionTrait;

use common::{AppError, AppResult};

use crate::repository::{CategoryStore, UserStore};

pub struct UniquenessGuard<'c, C> {
    conn: &'c C,
}

/// `except` is the id of the row being updated, which may keep its own key.
fn conflicts(found: Option<i32>, except: Option<i32>) -> bool {
    match (found, except) {
        (Some(id), Some(own)) => id != own,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

impl<'c, C: ConnectionTrait> UniquenessGuard<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn email_available(&self, email: &str, except: Option<i32>) -> AppResult<()> {
        let found = UserStore::new(self.conn).find_by_email(email).await?;
        if conflicts(found.map(|u| u.id), except) {
            tracing::warn!(email, "Rejected duplicate email");
            return Err(AppError::duplicate("Email is already in use"));
        }
        Ok(())
    }

    pub async fn user_name_available(
        &self,
        user_group_id: i32,
        name: &str,
        except: Option<i32>,
    ) -> AppResult<()> {
        let found = UserStore::new(self.conn)
            .find_by_scoped_name(user_group_id, name)
            .await?;
        if conflicts(found.map(|u| u.id), except) {
            tracing::warn!(user_group_id, name, "Rejected duplicate user name");
            return Err(AppError::duplicate(format!(
                "User name '{}' is already in use in this group",
                name
            )));
        }
        Ok(())
    }

    pub async fn category_name_available(
        &self,
        user_group_id: i32,
        name: &str,
        except: Option<i32>,
    ) -> AppResult<()> {
        let found = CategoryStore::new(self.conn)
            .find_by_scoped_name(user_group_id, name)
            .await?;
        if conflicts(found.map(|c| c.id), except) {
            tracing::warn!(user_group_id, name, "Rejected duplicate category name");
            return Err(AppError::duplicate(format!(
                "Category '{}' already exists in this group",
                name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::conflicts;

    #[test]
    fn test_conflict_rules() {
        assert!(!conflicts(None, None));
        assert!(!conflicts(None, Some(3)));
        assert!(conflicts(Some(3), None));
        // Renaming a row to its own current key is not a conflict
        assert!(!conflicts(Some(3), Some(3)));
        assert!(conflicts(Some(4), Some(3)));
    }
}
