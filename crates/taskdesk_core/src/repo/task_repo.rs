//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks and their label links.
//! - Provide one paginated query per filter shape.
//! - Offer a transaction boundary (`atomically`) to the service layer.
//!
//! # Invariants
//! - Write paths validate the record before any SQL mutation.
//! - Every write bumps `updated_at` strictly past its previous value.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Result order is fully determined: requested sort, then `uuid ASC`.

use crate::db::{register_sql_functions, DbError};
use crate::model::label::{Label, LabelId};
use crate::model::page::{Page, PageRequest, SortField};
use crate::model::task::{Priority, Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::schema::ensure_connection_ready;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    due_date,
    priority,
    is_completed,
    created_at,
    updated_at
FROM tasks";

const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

const PRIORITY_RANK_SQL: &str =
    "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 WHEN 'high' THEN 2 END";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task and label persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Task store interface.
pub trait TaskRepository {
    /// Runs `op` as one unit: every read and write inside commits together
    /// or rolls back together when `op` returns an error.
    fn atomically<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>;

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Inserts a new task and returns it with store-assigned id and timestamps.
    fn insert_task(&self, draft: &TaskDraft) -> RepoResult<Task>;
    /// Overwrites all mutable fields and the label links of an existing task.
    fn save_task(&self, task: &Task) -> RepoResult<Task>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;

    fn find_all(&self, page: &PageRequest) -> RepoResult<Page<Task>>;
    fn find_by_completed(&self, completed: bool, page: &PageRequest) -> RepoResult<Page<Task>>;
    fn find_by_priority(&self, priority: Priority, page: &PageRequest)
        -> RepoResult<Page<Task>>;
    /// Tasks linked to exactly `required_count` distinct ids from
    /// `label_ids`. Pass ids without duplicates and `required_count ==
    /// label_ids.len()` to get "has every label" semantics.
    fn find_by_all_labels(
        &self,
        label_ids: &[LabelId],
        required_count: usize,
        page: &PageRequest,
    ) -> RepoResult<Page<Task>>;
    /// Tasks whose due date lies in `[start_ms, end_ms]`.
    fn find_by_due_date_range(
        &self,
        start_ms: i64,
        end_ms: i64,
        page: &PageRequest,
    ) -> RepoResult<Page<Task>>;
    /// Case-insensitive (Unicode) substring match on title or description.
    fn find_by_text(&self, term: &str, page: &PageRequest) -> RepoResult<Page<Task>>;
}

/// SQLite-backed task store.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        // Text search needs it even on connections migrated outside `open_db`.
        register_sql_functions(conn)?;
        Ok(Self { conn })
    }

    fn query_page(
        &self,
        condition: &str,
        bind_values: Vec<Value>,
        request: &PageRequest,
    ) -> RepoResult<Page<Task>> {
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks WHERE {condition};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;
        let total_elements = u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {total}")))?;
        if total_elements == 0 {
            return Ok(Page::empty(*request));
        }

        let sql = format!(
            "{TASK_SELECT_SQL} WHERE {condition} ORDER BY {} LIMIT ? OFFSET ?;",
            order_by_sql(request)
        );
        let mut values = bind_values;
        values.push(Value::Integer(i64::from(request.size)));
        values.push(Value::Integer(request.offset()));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut content = Vec::new();
        while let Some(row) = rows.next()? {
            let mut task = parse_task_row(row)?;
            task.labels = load_labels_for_task(self.conn, &task.id.to_string())?;
            content.push(task);
        }

        Ok(Page {
            content,
            total_elements,
            request: *request,
        })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn atomically<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        // Dropping `tx` without commit rolls back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = op(self)?;
        tx.commit()?;
        Ok(value)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let id_text = id.to_string();
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id_text.as_str()])?;
        if let Some(row) = rows.next()? {
            let mut task = parse_task_row(row)?;
            task.labels = load_labels_for_task(self.conn, &id_text)?;
            return Ok(Some(task));
        }

        Ok(None)
    }

    fn insert_task(&self, draft: &TaskDraft) -> RepoResult<Task> {
        draft.validate()?;

        let id = Uuid::new_v4();
        let id_text = id.to_string();
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                due_date,
                priority,
                is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id_text.as_str(),
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.due_date,
                draft.priority.as_str(),
                bool_to_int(draft.completed),
            ],
        )?;
        replace_label_links(self.conn, &id_text, &draft.labels)?;

        self.get_task(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("task {id} missing after insert")))
    }

    fn save_task(&self, task: &Task) -> RepoResult<Task> {
        task.validate()?;

        let id_text = task.id.to_string();
        let changed = self.conn.execute(
            &format!(
                "UPDATE tasks
                 SET
                    title = ?2,
                    description = ?3,
                    due_date = ?4,
                    priority = ?5,
                    is_completed = ?6,
                    updated_at = MAX({NOW_MS_SQL}, updated_at + 1)
                 WHERE uuid = ?1;"
            ),
            params![
                id_text.as_str(),
                task.title.as_str(),
                task.description.as_deref(),
                task.due_date,
                task.priority.as_str(),
                bool_to_int(task.completed),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        replace_label_links(self.conn, &id_text, &task.labels)?;
        self.get_task(task.id)?.ok_or(RepoError::NotFound(task.id))
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        // `task_labels` rows cascade; `labels` rows are untouched.
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_all(&self, page: &PageRequest) -> RepoResult<Page<Task>> {
        self.query_page("1 = 1", Vec::new(), page)
    }

    fn find_by_completed(&self, completed: bool, page: &PageRequest) -> RepoResult<Page<Task>> {
        self.query_page(
            "is_completed = ?",
            vec![Value::Integer(bool_to_int(completed))],
            page,
        )
    }

    fn find_by_priority(
        &self,
        priority: Priority,
        page: &PageRequest,
    ) -> RepoResult<Page<Task>> {
        self.query_page(
            "priority = ?",
            vec![Value::Text(priority.as_str().to_string())],
            page,
        )
    }

    fn find_by_all_labels(
        &self,
        label_ids: &[LabelId],
        required_count: usize,
        page: &PageRequest,
    ) -> RepoResult<Page<Task>> {
        if label_ids.is_empty() {
            return Ok(Page::empty(*page));
        }

        let placeholders = vec!["?"; label_ids.len()].join(", ");
        let condition = format!(
            "uuid IN (
                SELECT task_uuid
                FROM task_labels
                WHERE label_id IN ({placeholders})
                GROUP BY task_uuid
                HAVING COUNT(DISTINCT label_id) = ?
            )"
        );
        let mut bind_values: Vec<Value> =
            label_ids.iter().map(|id| Value::Integer(*id)).collect();
        bind_values.push(Value::Integer(
            i64::try_from(required_count).unwrap_or(i64::MAX),
        ));

        self.query_page(&condition, bind_values, page)
    }

    fn find_by_due_date_range(
        &self,
        start_ms: i64,
        end_ms: i64,
        page: &PageRequest,
    ) -> RepoResult<Page<Task>> {
        self.query_page(
            "due_date BETWEEN ? AND ?",
            vec![Value::Integer(start_ms), Value::Integer(end_ms)],
            page,
        )
    }

    fn find_by_text(&self, term: &str, page: &PageRequest) -> RepoResult<Page<Task>> {
        let pattern = format!("%{}%", escape_like(term));
        self.query_page(
            "(unicode_lower(title) LIKE unicode_lower(?) ESCAPE '\\'
              OR unicode_lower(coalesce(description, '')) LIKE unicode_lower(?) ESCAPE '\\')",
            vec![Value::Text(pattern.clone()), Value::Text(pattern)],
            page,
        )
    }
}

fn order_by_sql(request: &PageRequest) -> String {
    let column = match request.sort_field {
        SortField::DueDate => "due_date",
        SortField::Priority => PRIORITY_RANK_SQL,
        SortField::CreatedAt => "created_at",
    };
    format!(
        "{column} {}, uuid ASC",
        request.direction.as_str().to_ascii_uppercase()
    )
}

/// Escapes LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn replace_label_links(conn: &Connection, task_uuid: &str, labels: &[Label]) -> RepoResult<()> {
    conn.execute("DELETE FROM task_labels WHERE task_uuid = ?1;", [task_uuid])?;
    for label in labels {
        conn.execute(
            "INSERT OR IGNORE INTO task_labels (task_uuid, label_id) VALUES (?1, ?2);",
            params![task_uuid, label.id],
        )?;
    }
    Ok(())
}

fn load_labels_for_task(conn: &Connection, task_uuid: &str) -> RepoResult<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.color
         FROM task_labels tl
         INNER JOIN labels l ON l.id = tl.label_id
         WHERE tl.task_uuid = ?1
         ORDER BY l.id ASC;",
    )?;
    let mut rows = stmt.query([task_uuid])?;
    let mut labels = Vec::new();
    while let Some(row) = rows.next()? {
        labels.push(Label {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        });
    }
    Ok(labels)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        priority,
        completed,
        labels: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
