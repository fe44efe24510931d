//! Connection readiness checks shared by SQLite repositories.

use crate::db::migrations::{current_version, latest_version};
use crate::repo::task_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Tables and the columns each repository reads or writes.
const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "tasks",
        &[
            "uuid",
            "title",
            "description",
            "due_date",
            "priority",
            "is_completed",
            "created_at",
            "updated_at",
        ],
    ),
    ("labels", &["id", "name", "color"]),
    ("task_labels", &["task_uuid", "label_id"]),
];

/// Rejects connections that were not opened through `db::open_db*` or whose
/// schema was altered underneath the repository.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(*table));
        }
        for column in *columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: *table,
                    column: *column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
