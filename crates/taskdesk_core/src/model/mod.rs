//! Domain model for tasks, labels and paged results.
//!
//! # Responsibility
//! - Define the records shared by the repository and service layers.
//! - Own the pure parsing/normalization rules (priority names, paging).
//!
//! # Invariants
//! - Tasks are identified by a store-assigned `TaskId`.
//! - Labels are independent of tasks and never deleted through them.

pub mod label;
pub mod page;
pub mod task;
