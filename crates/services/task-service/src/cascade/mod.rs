//! Cascade deletion over the UserGroup → User/Category → Task hierarchy.

mod engine;
mod graph;

pub use engine::{CascadeEngine, CascadeMode, CascadeReport};
pub use graph::{deletion_order, CascadePlan, DeletionStep, Dependency, EntityKind, DEPENDENCIES};
