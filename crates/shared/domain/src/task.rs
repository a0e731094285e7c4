//! Task domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::{DomainError, DomainResult};

/// Task progress state.
///
/// Stored as its numeric code; the schema restricts the column to 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TaskStatus {
    NotStarted = 1,
    InProgress = 2,
    Done = 3,
    LookBack = 4,
}

impl TaskStatus {
    /// Statuses shown on the task board
    pub const BOARD: [TaskStatus; 3] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Done,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::LookBack => "look_back",
        }
    }
}

impl TryFrom<i32> for TaskStatus {
    type Error = DomainError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TaskStatus::NotStarted),
            2 => Ok(TaskStatus::InProgress),
            3 => Ok(TaskStatus::Done),
            4 => Ok(TaskStatus::LookBack),
            other => Err(DomainError::validation(format!(
                "status: unknown task status {}",
                other
            ))),
        }
    }
}

impl From<TaskStatus> for i32 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub creator_user_id: i32,
    pub responsible_user_id: i32,
    pub category_id: i32,
    pub status: TaskStatus,
    pub estimate: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task creation input. The creator is always the acting user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub responsible_user_id: i32,
    pub category_id: i32,
    pub status: TaskStatus,
    #[validate(range(min = 1, message = "must be a positive number"))]
    pub estimate: Option<i32>,
    pub start_date: DateTime<Utc>,
}

impl NewTask {
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        Ok(())
    }
}

/// Partial task update. `None` leaves a field untouched.
///
/// `estimate` is doubly optional so it can be cleared: `Some(None)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub responsible_user_id: Option<i32>,
    pub category_id: Option<i32>,
    pub status: Option<TaskStatus>,
    pub estimate: Option<Option<i32>>,
    pub start_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.responsible_user_id.is_none()
            && self.category_id.is_none()
            && self.status.is_none()
            && self.estimate.is_none()
            && self.start_date.is_none()
    }

    pub fn check(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(Some(estimate)) = self.estimate {
            check_estimate(estimate)?;
        }
        Ok(())
    }
}

fn check_title(title: &str) -> DomainResult<()> {
    let len = title.chars().count();
    if len == 0 || len > crate::constants::MAX_TITLE_LENGTH {
        return Err(DomainError::validation(format!(
            "title: must be 1 to {} characters",
            crate::constants::MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn check_estimate(estimate: i32) -> DomainResult<()> {
    if estimate <= 0 {
        return Err(DomainError::validation("estimate: must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task() -> NewTask {
        NewTask {
            title: "Fix login".to_string(),
            description: String::new(),
            responsible_user_id: 1,
            category_id: 1,
            status: TaskStatus::NotStarted,
            estimate: Some(3),
            start_date: Utc::now(),
        }
    }

    #[test]
    fn test_status_codes() {
        for code in 1..=4 {
            let status = TaskStatus::try_from(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert!(TaskStatus::try_from(0).is_err());
        assert!(TaskStatus::try_from(5).is_err());
    }

    #[test]
    fn test_board_excludes_look_back() {
        assert!(!TaskStatus::BOARD.contains(&TaskStatus::LookBack));
    }

    #[test]
    fn test_new_task_rules() {
        assert!(new_task().check().is_ok());
        assert!(NewTask { estimate: None, ..new_task() }.check().is_ok());
        assert!(NewTask { estimate: Some(0), ..new_task() }.check().is_err());
        assert!(NewTask { title: String::new(), ..new_task() }.check().is_err());
    }

    #[test]
    fn test_patch_rules() {
        assert!(TaskPatch::default().is_empty());
        assert!(TaskPatch { estimate: Some(None), ..Default::default() }.check().is_ok());
        assert!(TaskPatch { estimate: Some(Some(-2)), ..Default::default() }.check().is_err());
        assert!(TaskPatch { title: Some("x".repeat(256)), ..Default::default() }.check().is_err());
    }
}
