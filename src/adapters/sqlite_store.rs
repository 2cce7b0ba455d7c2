//! SQLite-backed [`ConfigStore`].
//!
//! One connection behind a mutex; every statement runs on tokio's blocking
//! pool. Table and column names are only ever taken from the static column
//! lists in [`EntityKind`], never from caller input.

use crate::adapters::{check_fields, check_writable};
use crate::domain::ports::{Column, ColumnKind, ConfigStore, EntityKind, Fields, Record};
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SCHEMA_VERSION: i64 = 1;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS account (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS project (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    owner_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_project_owner ON project(owner_id);
CREATE TABLE IF NOT EXISTS url_config (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL,
    method TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    project_id INTEGER NOT NULL REFERENCES project(id) ON DELETE CASCADE,
    UNIQUE (project_id, path, method)
);
CREATE TABLE IF NOT EXISTS url_http_status (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_id INTEGER NOT NULL REFERENCES url_config(id) ON DELETE CASCADE,
    http_status INTEGER NOT NULL,
    percentage INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_url_http_status_url ON url_http_status(url_id);
CREATE TABLE IF NOT EXISTS response_model (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_http_status_id INTEGER NOT NULL REFERENCES url_http_status(id) ON DELETE CASCADE,
    model TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_response_model_status ON response_model(url_http_status_id);
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Clone)]
pub struct SqliteConfigStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteConfigStore {
    /// Opens (creating if needed) the database file and its schema.
    pub fn open(config: &SqliteStoreConfig) -> StoreResult<Self> {
        ensure_parent_dir(&config.path)?;
        let connection = Connection::open(&config.path)?;
        apply_pragmas(&connection, config.busy_timeout_ms, true)?;
        Self::with_connection(connection)
    }

    /// Private in-memory database; gone when the store is dropped.
    pub fn open_in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory()?;
        apply_pragmas(&connection, DEFAULT_BUSY_TIMEOUT_MS, false)?;
        Self::with_connection(connection)
    }

    fn with_connection(mut connection: Connection) -> StoreResult<Self> {
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Closes the connection if this is the last handle to it. Otherwise the
    /// connection is closed when the remaining handles drop.
    pub fn close(self) -> StoreResult<()> {
        match Arc::try_unwrap(self.connection) {
            Ok(mutex) => {
                let connection = mutex.into_inner().map_err(|_| StoreError::Unavailable {
                    message: "connection mutex poisoned".to_string(),
                })?;
                connection.close().map_err(|(_, err)| StoreError::SqliteError(err))
            }
            Err(_) => {
                tracing::debug!("SQLite connection still shared; closing on last drop");
                Ok(())
            }
        }
    }

    async fn run<T, F>(&self, operation: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = connection.lock().map_err(|_| StoreError::Unavailable {
                message: "connection mutex poisoned".to_string(),
            })?;
            operation(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable {
            message: format!("store task failed: {}", e),
        })?
    }
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
                message: format!("cannot create {}: {}", parent.display(), e),
            })
        }
        _ => Ok(()),
    }
}

fn apply_pragmas(connection: &Connection, busy_timeout_ms: u64, file_backed: bool) -> StoreResult<()> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    if file_backed {
        let mode: String =
            connection.query_row("PRAGMA journal_mode = WAL;", params![], |row| row.get(0))?;
        tracing::debug!("SQLite journal mode: {}", mode);
    }
    Ok(())
}

fn initialize_schema(connection: &mut Connection) -> StoreResult<()> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(SCHEMA)?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(other) => {
            return Err(StoreError::Unavailable {
                message: format!(
                    "unsupported schema version {} (expected {})",
                    other, SCHEMA_VERSION
                ),
            });
        }
    }
    tx.commit()?;
    Ok(())
}

fn map_error(kind: EntityKind, err: rusqlite::Error) -> StoreError {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        StoreError::ConstraintError {
            kind,
            message: err.to_string(),
        }
    } else {
        StoreError::SqliteError(err)
    }
}

fn column_list(kind: EntityKind) -> String {
    kind.columns()
        .iter()
        .map(|column| column.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql(kind: EntityKind, column: &Column, value: &Value) -> StoreResult<SqlValue> {
    let mismatch = |expected| StoreError::FieldTypeError {
        kind,
        field: column.name.to_string(),
        expected,
    };
    match column.kind {
        _ if value.is_null() => Ok(SqlValue::Null),
        ColumnKind::Integer => value
            .as_i64()
            .map(SqlValue::Integer)
            .ok_or_else(|| mismatch("integer")),
        ColumnKind::Text | ColumnKind::Json => value
            .as_str()
            .map(|text| SqlValue::Text(text.to_string()))
            .ok_or_else(|| mismatch("string")),
    }
}

fn read_row(kind: EntityKind, row: &Row<'_>) -> StoreResult<Fields> {
    let mut fields = Fields::new();
    for (index, column) in kind.columns().iter().enumerate() {
        let value = match column.kind {
            ColumnKind::Integer => row.get::<_, Option<i64>>(index)?.map_or(Value::Null, Value::from),
            ColumnKind::Text | ColumnKind::Json => {
                row.get::<_, Option<String>>(index)?.map_or(Value::Null, Value::from)
            }
        };
        fields.insert(column.name.to_string(), value);
    }
    Ok(fields)
}

fn select(connection: &Connection, kind: EntityKind, filter: &Fields) -> StoreResult<Vec<Record>> {
    let mut sql = format!("SELECT {} FROM {}", column_list(kind), kind.as_str());
    let mut values = Vec::with_capacity(filter.len());
    for (index, (name, value)) in filter.iter().enumerate() {
        let column = kind.column(name)?;
        sql.push_str(if index == 0 { " WHERE " } else { " AND " });
        sql.push_str(&format!("{} = ?{}", column.name, index + 1));
        values.push(to_sql(kind, column, value)?);
    }
    sql.push_str(" ORDER BY id");

    let mut statement = connection.prepare(&sql)?;
    let mut rows = statement.query(params_from_iter(values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(Record::new(read_row(kind, row)?));
    }
    Ok(records)
}

fn select_by_id(connection: &Connection, kind: EntityKind, id: i64) -> StoreResult<Record> {
    let mut filter = Fields::new();
    filter.insert("id".to_string(), Value::from(id));
    select(connection, kind, &filter)?
        .into_iter()
        .next()
        .ok_or(StoreError::NotFound { kind, id })
}

fn bind_fields(kind: EntityKind, fields: &Fields) -> StoreResult<(Vec<&'static str>, Vec<SqlValue>)> {
    let mut names = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let column = kind.column(name)?;
        names.push(column.name);
        values.push(to_sql(kind, column, value)?);
    }
    Ok((names, values))
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn create(&self, kind: EntityKind, fields: Fields) -> StoreResult<Record> {
        check_writable(kind, &fields, true)?;
        self.run(move |connection| {
            let (names, values) = bind_fields(kind, &fields)?;
            let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                kind.as_str(),
                names.join(", "),
                placeholders.join(", ")
            );
            connection
                .execute(&sql, params_from_iter(values))
                .map_err(|e| map_error(kind, e))?;
            let id = connection.last_insert_rowid();
            select_by_id(connection, kind, id)
        })
        .await
    }

    async fn read(&self, kind: EntityKind, id: i64) -> StoreResult<Record> {
        self.run(move |connection| select_by_id(connection, kind, id)).await
    }

    async fn list(&self, kind: EntityKind, filter: Fields) -> StoreResult<Vec<Record>> {
        check_fields(kind, &filter)?;
        self.run(move |connection| select(connection, kind, &filter)).await
    }

    async fn update(&self, kind: EntityKind, id: i64, fields: Fields) -> StoreResult<Record> {
        check_writable(kind, &fields, false)?;
        self.run(move |connection| {
            if fields.is_empty() {
                return select_by_id(connection, kind, id);
            }
            let (names, mut values) = bind_fields(kind, &fields)?;
            let assignments: Vec<String> = names
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{} = ?{}", name, i + 1))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE id = ?{}",
                kind.as_str(),
                assignments.join(", "),
                names.len() + 1
            );
            values.push(SqlValue::Integer(id));
            let changed = connection
                .execute(&sql, params_from_iter(values))
                .map_err(|e| map_error(kind, e))?;
            if changed == 0 {
                return Err(StoreError::NotFound { kind, id });
            }
            select_by_id(connection, kind, id)
        })
        .await
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> StoreResult<()> {
        self.run(move |connection| {
            let sql = format!("DELETE FROM {} WHERE id = ?1", kind.as_str());
            let changed = connection
                .execute(&sql, params![id])
                .map_err(|e| map_error(kind, e))?;
            if changed == 0 {
                return Err(StoreError::NotFound { kind, id });
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    #[tokio::test]
    async fn test_json_column_round_trips_verbatim() {
        let store = SqliteConfigStore::open_in_memory().unwrap();
        store
            .create(EntityKind::Account, fields(json!({"email": "a@example.com", "password": "h"})))
            .await
            .unwrap();
        store
            .create(EntityKind::Project, fields(json!({"name": "Demo", "owner_id": 1})))
            .await
            .unwrap();
        store
            .create(
                EntityKind::UrlConfig,
                fields(json!({"path": "/ping", "method": "GET", "project_id": 1})),
            )
            .await
            .unwrap();
        store
            .create(
                EntityKind::UrlHttpStatus,
                fields(json!({"url_id": 1, "http_status": 200, "percentage": 100})),
            )
            .await
            .unwrap();

        let body = r#"{"ok": true, "items": [1, 2, {"deep": null}], "big": 12345678901234567890123}"#;
        let created = store
            .create(
                EntityKind::ResponseModel,
                fields(json!({"url_http_status_id": 1, "model": body})),
            )
            .await
            .unwrap();

        assert_eq!(created.data["model"], body);
        assert_eq!(created.data["description"], "");
        let read = store.read(EntityKind::ResponseModel, created.id().unwrap()).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_constraint_violation_is_reported_as_constraint() {
        let store = SqliteConfigStore::open_in_memory().unwrap();
        let account = fields(json!({"email": "a@example.com", "password": "h"}));
        store.create(EntityKind::Account, account.clone()).await.unwrap();

        let err = store.create(EntityKind::Account, account).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintError { kind: EntityKind::Account, .. }));

        let err = store
            .create(EntityKind::Project, fields(json!({"name": "Orphan", "owner_id": 99})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintError { .. }));
    }

    #[tokio::test]
    async fn test_filter_with_hostile_column_name_is_rejected() {
        let store = SqliteConfigStore::open_in_memory().unwrap();
        let err = store
            .list(EntityKind::Account, fields(json!({"1=1 OR email": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_close_releases_last_handle() {
        let store = SqliteConfigStore::open_in_memory().unwrap();
        let clone = store.clone();
        // a shared handle is left open for the other owner
        store.close().unwrap();
        clone
            .create(EntityKind::Account, fields(json!({"email": "a@example.com", "password": "h"})))
            .await
            .unwrap();
        clone.close().unwrap();
    }
}
