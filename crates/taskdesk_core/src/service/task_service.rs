//! Task use-case service.
//!
//! # Responsibility
//! - Dispatch list filters to the matching store query.
//! - Apply create / partial-update / toggle / delete semantics.
//! - Resolve label ids against the label store.
//!
//! # Invariants
//! - Every mutating call runs inside one `TaskRepository::atomically` unit.
//! - Unparseable priority text never becomes an error: create falls back to
//!   `medium`, update keeps the current value.
//! - Label ids missing from the label store are dropped silently.
//! - Log events carry ids and counts only, never titles or descriptions.

use crate::model::label::{Label, LabelId};
use crate::model::page::{Page, PageRequest};
use crate::model::task::{
    normalize_labels, NewTask, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskValidationError,
};
use crate::repo::label_repo::{LabelRepository, SqliteLabelRepository};
use crate::repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
use crate::service::task_filter::{resolve_query, TaskFilter, TaskQuery};
use log::{debug, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// No task exists for the id.
    TaskNotFound(TaskId),
    /// Resulting task would violate a record invariant.
    InvalidTask(TaskValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidTask(err) => write!(f, "invalid task: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::InvalidTask(err),
            other => Self::Repo(other),
        }
    }
}

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task service facade over task and label stores.
pub struct TaskService<T: TaskRepository, L: LabelRepository> {
    tasks: T,
    labels: L,
}

/// Task service wired to SQLite stores sharing one connection.
pub type SqliteTaskService<'conn> =
    TaskService<SqliteTaskRepository<'conn>, SqliteLabelRepository<'conn>>;

/// Builds a [`SqliteTaskService`] over a migrated connection.
pub fn sqlite_task_service(conn: &Connection) -> RepoResult<SqliteTaskService<'_>> {
    Ok(TaskService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteLabelRepository::try_new(conn)?,
    ))
}

impl<T: TaskRepository, L: LabelRepository> TaskService<T, L> {
    pub fn new(tasks: T, labels: L) -> Self {
        Self { tasks, labels }
    }

    /// Lists tasks matching the single highest-precedence filter criterion.
    pub fn find_tasks(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> TaskServiceResult<Page<Task>> {
        let query = resolve_query(filter);
        let result = self.run_query(&query, page)?;
        debug!(
            "event=task_list module=service status=ok branch={} page={} size={} sort={} order={} total={}",
            query.branch(),
            page.client_page(),
            page.size,
            page.sort_field.as_str(),
            page.direction.as_str(),
            result.total_elements
        );
        Ok(result)
    }

    /// Runs an already resolved query against the task store.
    pub fn run_query(&self, query: &TaskQuery, page: &PageRequest) -> RepoResult<Page<Task>> {
        match query {
            TaskQuery::All => self.tasks.find_all(page),
            TaskQuery::ByCompletion(completed) => self.tasks.find_by_completed(*completed, page),
            TaskQuery::ByPriority(priority) => self.tasks.find_by_priority(*priority, page),
            TaskQuery::ByAllLabels(ids) => self.tasks.find_by_all_labels(ids, ids.len(), page),
            TaskQuery::ByDueDateRange { start_ms, end_ms } => {
                self.tasks.find_by_due_date_range(*start_ms, *end_ms, page)
            }
            TaskQuery::ByText(term) => self.tasks.find_by_text(term, page),
        }
    }

    /// Creates a task, defaulting what the request leaves out.
    ///
    /// # Contract
    /// - Missing or unrecognized `priority` becomes `medium`.
    /// - Missing `completed` becomes `false`.
    /// - `label_ids` resolve through the label store; unknown ids are dropped.
    pub fn create_task(&self, input: NewTask) -> TaskServiceResult<Task> {
        let created = self.tasks.atomically(|tasks| {
            let labels = match input.label_ids.as_deref() {
                Some(ids) if !ids.is_empty() => self.resolve_labels(ids)?,
                _ => Vec::new(),
            };
            let draft = TaskDraft {
                title: input.title,
                description: input.description,
                due_date: input.due_date,
                priority: priority_for_create(input.priority.as_deref()),
                completed: input.completed.unwrap_or(false),
                labels,
            };
            tasks.insert_task(&draft)
        })?;

        info!(
            "event=task_create module=service status=ok task_id={} label_count={}",
            created.id,
            created.labels.len()
        );
        Ok(created)
    }

    /// Gets one task by id.
    pub fn get_task(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.tasks
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    /// Applies a sparse update.
    ///
    /// # Contract
    /// - Only fields present in `patch` change.
    /// - Present but unrecognized `priority` leaves the priority unchanged.
    /// - Present `label_ids` replaces the whole label set, even when empty.
    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) -> TaskServiceResult<Task> {
        let updated = self.tasks.atomically(|tasks| {
            let mut task = tasks.get_task(id)?.ok_or(RepoError::NotFound(id))?;
            self.apply_patch(&mut task, patch)?;
            tasks.save_task(&task)
        })?;

        info!("event=task_update module=service status=ok task_id={id}");
        Ok(updated)
    }

    /// Flips the completion flag.
    pub fn toggle_task_completion(&self, id: TaskId) -> TaskServiceResult<Task> {
        let toggled = self.tasks.atomically(|tasks| {
            let mut task = tasks.get_task(id)?.ok_or(RepoError::NotFound(id))?;
            task.completed = !task.completed;
            tasks.save_task(&task)
        })?;

        info!(
            "event=task_toggle module=service status=ok task_id={id} completed={}",
            toggled.completed
        );
        Ok(toggled)
    }

    /// Deletes a task. Its labels stay in the label store.
    pub fn delete_task(&self, id: TaskId) -> TaskServiceResult<()> {
        self.tasks.atomically(|tasks| tasks.delete_task(id))?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    fn apply_patch(&self, task: &mut Task, patch: &TaskPatch) -> RepoResult<()> {
        if let Some(title) = &patch.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        task.priority = priority_for_update(task.priority, patch.priority.as_deref());
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(ids) = &patch.label_ids {
            task.set_labels(self.resolve_labels(ids)?);
        }
        Ok(())
    }

    fn resolve_labels(&self, ids: &[LabelId]) -> RepoResult<Vec<Label>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = normalize_labels(self.labels.find_labels_by_ids(ids)?);
        if found.len() < ids.len() {
            debug!(
                "event=label_resolve module=service status=partial requested={} found={}",
                ids.len(),
                found.len()
            );
        }
        Ok(found)
    }
}

/// Create-path policy: absent or unrecognized text means `medium`.
pub fn priority_for_create(raw: Option<&str>) -> Priority {
    match raw.map(Priority::parse) {
        Some(Ok(priority)) => priority,
        Some(Err(_)) => {
            debug!("event=priority_fallback module=service policy=default_medium");
            Priority::default()
        }
        None => Priority::default(),
    }
}

/// Update-path policy: absent or unrecognized text keeps `current`.
pub fn priority_for_update(current: Priority, raw: Option<&str>) -> Priority {
    match raw.map(Priority::parse) {
        Some(Ok(priority)) => priority,
        Some(Err(_)) => {
            debug!("event=priority_fallback module=service policy=keep_current");
            current
        }
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::{priority_for_create, priority_for_update};
    use crate::model::task::Priority;

    #[test]
    fn create_policy_defaults_to_medium() {
        assert_eq!(priority_for_create(None), Priority::Medium);
        assert_eq!(priority_for_create(Some("bogus")), Priority::Medium);
        assert_eq!(priority_for_create(Some("low")), Priority::Low);
    }

    #[test]
    fn update_policy_keeps_current_value() {
        assert_eq!(priority_for_update(Priority::High, None), Priority::High);
        assert_eq!(priority_for_update(Priority::High, Some("bogus")), Priority::High);
        assert_eq!(priority_for_update(Priority::High, Some("low")), Priority::Low);
    }
}
