//! SeaORM entities for the four tables of the ownership hierarchy.

pub mod category;
pub mod task;
pub mod user;
pub mod user_group;
