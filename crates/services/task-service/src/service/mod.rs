//! Application services layer - use cases over the Unit of Work.
//!
//! Each service opens at most one transaction per mutating operation.
//! Callers pass the acting user's id, resolved from a session token.

mod auth_service;
mod category_service;
mod guest_service;
mod session;
mod task_service;
mod user_group_service;
mod user_service;

pub use auth_service::{AuthService, AuthSession, Authenticator};
pub use category_service::{CategoryManager, CategoryService};
pub use guest_service::{reset_guest_group, GuestLifecycle, GuestManager};
pub use session::{Claims, IdentityResolver, SessionTokens, TokenResponse};
pub use task_service::{TaskManager, TaskService};
pub use user_group_service::{UserGroupManager, UserGroupService};
pub use user_service::{UserManager, UserService};
