//! Label domain model.
//!
//! Labels are owned independently of tasks: removing a task only removes
//! its link rows, never the label.

use serde::{Deserialize, Serialize};

/// Store-assigned label identifier.
pub type LabelId = i64;

/// Reusable tag attachable to many tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    /// Free-form color text (hex code or name).
    pub color: String,
}

/// Insert request for a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabel {
    pub name: String,
    pub color: String,
}

impl NewLabel {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}
