//! Repository layer: store contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define the task and label store contracts the services depend on.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest schema.
//! - Missing tasks surface as `RepoError::NotFound`, distinct from
//!   transport errors.

pub mod label_repo;
mod schema;
pub mod task_repo;
