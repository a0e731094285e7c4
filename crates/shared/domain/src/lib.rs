//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod category;
pub mod constants;
pub mod error;
pub mod guest;
pub mod password;
pub mod task;
pub mod user;
pub mod user_group;

pub use category::{Category, CategoryInput};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{check_password_policy, Argon2Hasher, PasswordHasher};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
pub use user::{check_name, check_ordinary_group, CreateUser, EmailInput, SignUp, User, UserResponse};
pub use user_group::{NewUserGroup, UserGroup};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockPasswordHasher;
