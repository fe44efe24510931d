//! Label store contract and SQLite implementation.
//!
//! The task service only reads labels (`find_labels_by_ids`); the write
//! path exists so callers can seed and manage the label catalog.

use crate::model::label::{Label, LabelId, NewLabel};
use crate::repo::schema::ensure_connection_ready;
use crate::repo::task_repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

/// Label store interface.
pub trait LabelRepository {
    fn create_label(&self, label: &NewLabel) -> RepoResult<Label>;
    fn get_label(&self, id: LabelId) -> RepoResult<Option<Label>>;
    /// Returns every label sorted by id.
    fn list_labels(&self) -> RepoResult<Vec<Label>>;
    /// Returns the labels that exist among `ids`, sorted by id.
    ///
    /// Unknown ids are skipped, never reported.
    fn find_labels_by_ids(&self, ids: &[LabelId]) -> RepoResult<Vec<Label>>;
}

/// SQLite-backed label store.
pub struct SqliteLabelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLabelRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LabelRepository for SqliteLabelRepository<'_> {
    fn create_label(&self, label: &NewLabel) -> RepoResult<Label> {
        self.conn.execute(
            "INSERT INTO labels (name, color) VALUES (?1, ?2);",
            params![label.name.as_str(), label.color.as_str()],
        )?;
        Ok(Label {
            id: self.conn.last_insert_rowid(),
            name: label.name.clone(),
            color: label.color.clone(),
        })
    }

    fn get_label(&self, id: LabelId) -> RepoResult<Option<Label>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM labels WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_label_row(row)?));
        }
        Ok(None)
    }

    fn list_labels(&self) -> RepoResult<Vec<Label>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM labels ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(parse_label_row(row)?);
        }
        Ok(labels)
    }

    fn find_labels_by_ids(&self, ids: &[LabelId]) -> RepoResult<Vec<Label>> {
        let unique: BTreeSet<LabelId> = ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; unique.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, color FROM labels WHERE id IN ({placeholders}) ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(unique.into_iter().map(Value::Integer)))?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(parse_label_row(row)?);
        }
        Ok(labels)
    }
}

fn parse_label_row(row: &Row<'_>) -> RepoResult<Label> {
    Ok(Label {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
    })
}
