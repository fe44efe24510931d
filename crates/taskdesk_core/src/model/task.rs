//! Task domain model and mutation inputs.
//!
//! # Responsibility
//! - Define the persisted `Task` record and its `Priority` enum.
//! - Define the create (`NewTask`) and partial-update (`TaskPatch`) inputs.
//!
//! # Invariants
//! - `priority` is always one of `low|medium|high`; raw strings only enter
//!   through [`Priority::parse`].
//! - `labels` are unique by id and kept sorted by id.
//! - `title` is non-blank for every persisted task.

use crate::model::label::{Label, LabelId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned task identifier.
pub type TaskId = Uuid;

/// Task urgency level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parses the canonical lowercase name.
    ///
    /// Matching is exact: `"High"` and `" high"` are unrecognized. Callers
    /// decide how to recover from [`UnrecognizedPriority`].
    pub fn parse(value: &str) -> Result<Self, UnrecognizedPriority> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(UnrecognizedPriority(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = UnrecognizedPriority;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw priority text that names none of `low|medium|high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedPriority(pub String);

impl Display for UnrecognizedPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized priority `{}`; expected low|medium|high",
            self.0
        )
    }
}

impl Error for UnrecognizedPriority {}

/// Write-time validation failure for task records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace only.
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Persisted task as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Unix epoch milliseconds (UTC).
    pub due_date: Option<i64>,
    pub priority: Priority,
    pub completed: bool,
    /// Sorted by label id, no duplicates.
    pub labels: Vec<Label>,
    /// Unix epoch milliseconds, set by the store on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by the store on every write.
    pub updated_at: i64,
}

impl Task {
    /// Checks invariants required before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }

    /// Replaces the label set, normalizing order and duplicates.
    pub fn set_labels(&mut self, labels: Vec<Label>) {
        self.labels = normalize_labels(labels);
    }
}

/// Fully resolved field set for inserting a new task.
///
/// Built by the service after priority defaulting and label resolution;
/// the store assigns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Priority,
    pub completed: bool,
    pub labels: Vec<Label>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

/// Create request as received from callers.
///
/// `priority` stays raw text so the create path can apply its own recovery
/// policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub label_ids: Option<Vec<LabelId>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Sparse update request.
///
/// `None` leaves the field unchanged. For `label_ids`, `Some(vec![])`
/// clears every label while `None` keeps them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub label_ids: Option<Vec<LabelId>>,
}

impl TaskPatch {
    /// Returns true when applying the patch would change no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.label_ids.is_none()
    }
}

/// Sorts labels by id and drops repeated ids.
pub fn normalize_labels(mut labels: Vec<Label>) -> Vec<Label> {
    labels.sort_by_key(|label| label.id);
    labels.dedup_by_key(|label| label.id);
    labels
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::BlankTitle);
    }
    Ok(())
}
