//! Best-effort batch updates.
//!
//! # Invariants
//! - Items are applied in input order, each in its own transaction; one
//!   item failing never rolls back another.
//! - Item-level failures (missing task, invalid resulting task) become
//!   [`BatchItemOutcome::Skipped`].
//! - Infrastructure failures stop the batch and propagate. Items applied
//!   before the failure stay committed.

use crate::model::task::{Task, TaskId, TaskPatch};
use crate::repo::label_repo::LabelRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::task_service::{TaskService, TaskServiceError, TaskServiceResult};
use log::{error, info};
use serde::{Deserialize, Serialize};

/// One `(id, patch)` pair of a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdateItem {
    pub id: TaskId,
    pub patch: TaskPatch,
}

impl BatchUpdateItem {
    pub fn new(id: TaskId, patch: TaskPatch) -> Self {
        Self { id, patch }
    }
}

/// Why an item contributed nothing to the batch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    InvalidTask,
}

/// Per-item result of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItemOutcome {
    Updated(Task),
    Skipped { id: TaskId, reason: SkipReason },
}

/// Outcomes for every item, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<BatchItemOutcome>,
}

impl BatchReport {
    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, BatchItemOutcome::Updated(_)))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (TaskId, SkipReason)> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BatchItemOutcome::Skipped { id, reason } => Some((*id, *reason)),
            BatchItemOutcome::Updated(_) => None,
        })
    }

    /// Successfully updated tasks in input order.
    pub fn into_updated(self) -> Vec<Task> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                BatchItemOutcome::Updated(task) => Some(task),
                BatchItemOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}

impl<T: TaskRepository, L: LabelRepository> TaskService<T, L> {
    /// Applies each update independently and returns only the tasks that
    /// were updated. Missing ids are skipped silently.
    pub fn batch_update_tasks(&self, items: &[BatchUpdateItem]) -> TaskServiceResult<Vec<Task>> {
        Ok(self.batch_update_outcomes(items)?.into_updated())
    }

    /// Same as [`Self::batch_update_tasks`] but keeps the per-item outcome.
    pub fn batch_update_outcomes(
        &self,
        items: &[BatchUpdateItem],
    ) -> TaskServiceResult<BatchReport> {
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(items.len()),
        };

        for item in items {
            let outcome = match self.update_task(item.id, &item.patch) {
                Ok(task) => BatchItemOutcome::Updated(task),
                Err(TaskServiceError::TaskNotFound(id)) => BatchItemOutcome::Skipped {
                    id,
                    reason: SkipReason::NotFound,
                },
                Err(TaskServiceError::InvalidTask(_)) => BatchItemOutcome::Skipped {
                    id: item.id,
                    reason: SkipReason::InvalidTask,
                },
                Err(err) => {
                    error!(
                        "event=task_batch_update module=service status=error task_id={} applied={} requested={} error={}",
                        item.id,
                        report.updated_count(),
                        items.len(),
                        err
                    );
                    return Err(err);
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            "event=task_batch_update module=service status=ok requested={} updated={} skipped={}",
            items.len(),
            report.updated_count(),
            items.len() - report.updated_count()
        );
        Ok(report)
    }
}
