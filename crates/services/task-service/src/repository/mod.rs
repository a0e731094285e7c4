//! Repository layer for data access.
//!
//! Stores are thin typed wrappers over any SeaORM connection, so the same
//! code runs against the pool or inside a transaction.

pub mod entities;
mod category_store;
mod task_store;
mod user_group_store;
mod user_store;

pub use category_store::CategoryStore;
pub use task_store::{TaskRecord, TaskStore};
pub use user_group_store::UserGroupStore;
pub use user_store::{UserChanges, UserRecord, UserStore};
