//! Core domain logic for the Taskdesk task manager.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::label::{Label, LabelId, NewLabel};
pub use model::page::{
    Page, PageRequest, SortDirection, SortField, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use model::task::{
    NewTask, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskValidationError,
    UnrecognizedPriority,
};
pub use repo::label_repo::{LabelRepository, SqliteLabelRepository};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::batch::{BatchItemOutcome, BatchReport, BatchUpdateItem, SkipReason};
pub use service::task_filter::{resolve_query, FilterCriterion, TaskFilter, TaskQuery};
pub use service::task_service::{
    sqlite_task_service, SqliteTaskService, TaskService, TaskServiceError, TaskServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
