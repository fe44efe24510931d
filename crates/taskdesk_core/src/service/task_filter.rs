//! Filter resolution for task list queries.
//!
//! # Responsibility
//! - Turn optional, caller-supplied filter inputs into exactly one
//!   [`TaskQuery`].
//!
//! # Invariants
//! - Criteria are mutually exclusive. [`FILTER_PRECEDENCE`] is checked in
//!   order and the first rule that fires decides the query; later criteria
//!   are ignored even when supplied.
//! - An unrecognized priority still fires the priority rule but resolves to
//!   [`TaskQuery::All`].
//! - Resolution never fails.

use crate::model::label::LabelId;
use crate::model::task::Priority;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Raw list filters as received from callers. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    /// `all`, `completed`, or anything else (treated as active).
    pub status: Option<String>,
    pub priority: Option<String>,
    pub label_ids: Option<Vec<LabelId>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Filter inputs in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCriterion {
    Status,
    Priority,
    Labels,
    DueDateRange,
    Search,
}

/// The single store query selected for a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskQuery {
    All,
    ByCompletion(bool),
    ByPriority(Priority),
    /// Tasks carrying every listed label. Ids are unique and sorted.
    ByAllLabels(Vec<LabelId>),
    /// Inclusive due-date bounds in epoch milliseconds.
    ByDueDateRange { start_ms: i64, end_ms: i64 },
    ByText(String),
}

impl TaskQuery {
    /// Stable branch name used in log events.
    pub fn branch(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ByCompletion(_) => "completion",
            Self::ByPriority(_) => "priority",
            Self::ByAllLabels(_) => "labels",
            Self::ByDueDateRange { .. } => "due_date_range",
            Self::ByText(_) => "text",
        }
    }
}

type FilterRule = fn(&TaskFilter) -> Option<TaskQuery>;

/// Filter rules, highest precedence first.
pub const FILTER_PRECEDENCE: &[(FilterCriterion, FilterRule)] = &[
    (FilterCriterion::Status, status_rule),
    (FilterCriterion::Priority, priority_rule),
    (FilterCriterion::Labels, labels_rule),
    (FilterCriterion::DueDateRange, due_date_range_rule),
    (FilterCriterion::Search, search_rule),
];

/// Resolves the filter to one query; no matching rule means all tasks.
pub fn resolve_query(filter: &TaskFilter) -> TaskQuery {
    resolve_with_criterion(filter).map_or(TaskQuery::All, |(_, query)| query)
}

/// Returns the criterion that decides the query, if any fires.
pub fn matched_criterion(filter: &TaskFilter) -> Option<FilterCriterion> {
    resolve_with_criterion(filter).map(|(criterion, _)| criterion)
}

fn resolve_with_criterion(filter: &TaskFilter) -> Option<(FilterCriterion, TaskQuery)> {
    FILTER_PRECEDENCE
        .iter()
        .find_map(|(criterion, rule)| rule(filter).map(|query| (*criterion, query)))
}

fn status_rule(filter: &TaskFilter) -> Option<TaskQuery> {
    filter
        .status
        .as_deref()
        .filter(|status| *status != "all")
        .map(|status| TaskQuery::ByCompletion(status == "completed"))
}

fn priority_rule(filter: &TaskFilter) -> Option<TaskQuery> {
    filter
        .priority
        .as_deref()
        .map(|raw| match Priority::parse(raw) {
            Ok(priority) => TaskQuery::ByPriority(priority),
            Err(_) => TaskQuery::All,
        })
}

fn labels_rule(filter: &TaskFilter) -> Option<TaskQuery> {
    filter
        .label_ids
        .as_ref()
        .filter(|ids| !ids.is_empty())
        .map(|ids| {
            let unique: BTreeSet<LabelId> = ids.iter().copied().collect();
            TaskQuery::ByAllLabels(unique.into_iter().collect())
        })
}

fn due_date_range_rule(filter: &TaskFilter) -> Option<TaskQuery> {
    match (filter.start_date, filter.end_date) {
        (Some(start), Some(end)) => Some(TaskQuery::ByDueDateRange {
            start_ms: start_of_day_ms(start),
            end_ms: end_of_day_ms(end),
        }),
        _ => None,
    }
}

fn search_rule(filter: &TaskFilter) -> Option<TaskQuery> {
    filter
        .search
        .as_ref()
        .filter(|term| !term.trim().is_empty())
        .map(|term| TaskQuery::ByText(term.clone()))
}

/// First millisecond of `date` in UTC.
pub fn start_of_day_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Last millisecond of `date` in UTC.
pub fn end_of_day_ms(date: NaiveDate) -> i64 {
    start_of_day_ms(date) + MILLIS_PER_DAY - 1
}
