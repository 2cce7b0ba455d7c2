//! In-process [`ConfigStore`] with the same constraint behaviour as the SQLite
//! schema: unique keys, foreign keys and cascading deletes.

use crate::adapters::{check_fields, check_writable};
use crate::domain::ports::{ColumnKind, ConfigStore, EntityKind, Fields, Record};
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Fields>,
    last_id: i64,
}

#[derive(Debug, Default)]
struct Tables {
    tables: HashMap<EntityKind, Table>,
}

impl Tables {
    fn rows(&self, kind: EntityKind) -> impl Iterator<Item = (&i64, &Fields)> {
        self.tables
            .get(&kind)
            .into_iter()
            .flat_map(|table| table.rows.iter())
    }

    fn get(&self, kind: EntityKind, id: i64) -> Option<&Fields> {
        self.tables.get(&kind).and_then(|table| table.rows.get(&id))
    }

    fn check_parent(&self, kind: EntityKind, row: &Fields) -> StoreResult<()> {
        let Some((parent, fk)) = kind.parent() else {
            return Ok(());
        };
        let exists = row
            .get(fk)
            .and_then(Value::as_i64)
            .is_some_and(|parent_id| self.get(parent, parent_id).is_some());
        if !exists {
            return Err(StoreError::ConstraintError {
                kind,
                message: format!("FOREIGN KEY constraint failed: {}.{}", kind, fk),
            });
        }
        Ok(())
    }

    fn check_unique(&self, kind: EntityKind, row: &Fields, current: Option<i64>) -> StoreResult<()> {
        for key in kind.unique_keys() {
            let clash = self.rows(kind).any(|(id, existing)| {
                Some(*id) != current && key.iter().all(|column| existing.get(*column) == row.get(*column))
            });
            if clash {
                let columns: Vec<String> = key.iter().map(|column| format!("{}.{}", kind, column)).collect();
                return Err(StoreError::ConstraintError {
                    kind,
                    message: format!("UNIQUE constraint failed: {}", columns.join(", ")),
                });
            }
        }
        Ok(())
    }

    fn remove_cascade(&mut self, kind: EntityKind, id: i64) {
        if let Some(table) = self.tables.get_mut(&kind) {
            table.rows.remove(&id);
        }
        for (child, fk) in kind.children() {
            let orphans: Vec<i64> = self
                .rows(child)
                .filter(|(_, row)| row.get(fk).and_then(Value::as_i64) == Some(id))
                .map(|(child_id, _)| *child_id)
                .collect();
            for orphan in orphans {
                self.remove_cascade(child, orphan);
            }
        }
    }
}

/// Text columns that may be omitted are stored as empty strings, matching the
/// `DEFAULT ''` of the SQLite schema.
fn with_defaults(kind: EntityKind, mut fields: Fields) -> Fields {
    for column in kind.columns() {
        if column.name != "id" && !column.required && column.kind == ColumnKind::Text {
            fields
                .entry(column.name.to_string())
                .or_insert_with(|| Value::String(String::new()));
        }
    }
    fields
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn create(&self, kind: EntityKind, fields: Fields) -> StoreResult<Record> {
        check_writable(kind, &fields, true)?;
        let mut row = with_defaults(kind, fields);

        let mut tables = self.tables.lock().await;
        tables.check_parent(kind, &row)?;
        tables.check_unique(kind, &row, None)?;

        let table = tables.tables.entry(kind).or_default();
        table.last_id += 1;
        let id = table.last_id;
        row.insert("id".to_string(), Value::from(id));
        table.rows.insert(id, row.clone());

        Ok(Record::new(row))
    }

    async fn read(&self, kind: EntityKind, id: i64) -> StoreResult<Record> {
        let tables = self.tables.lock().await;
        tables
            .get(kind, id)
            .cloned()
            .map(Record::new)
            .ok_or(StoreError::NotFound { kind, id })
    }

    async fn list(&self, kind: EntityKind, filter: Fields) -> StoreResult<Vec<Record>> {
        check_fields(kind, &filter)?;
        let tables = self.tables.lock().await;
        Ok(tables
            .rows(kind)
            .filter(|(_, row)| filter.iter().all(|(column, value)| row.get(column) == Some(value)))
            .map(|(_, row)| Record::new(row.clone()))
            .collect())
    }

    async fn update(&self, kind: EntityKind, id: i64, fields: Fields) -> StoreResult<Record> {
        check_writable(kind, &fields, false)?;

        let mut tables = self.tables.lock().await;
        let mut row = tables
            .get(kind, id)
            .cloned()
            .ok_or(StoreError::NotFound { kind, id })?;
        row.extend(fields);

        tables.check_parent(kind, &row)?;
        tables.check_unique(kind, &row, Some(id))?;
        tables
            .tables
            .entry(kind)
            .or_default()
            .rows
            .insert(id, row.clone());

        Ok(Record::new(row))
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.get(kind, id).is_none() {
            return Err(StoreError::NotFound { kind, id });
        }
        tables.remove_cascade(kind, id);
        Ok(())
    }
}
