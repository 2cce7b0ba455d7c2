// Adapters layer: concrete implementations of the domain ports (storage, credentials).

pub mod jwt;
pub mod memory_store;
pub mod password;
pub mod sqlite_store;

use crate::config::toml_config::{DatabaseConfig, StoreBackend};
use crate::domain::ports::{ColumnKind, EntityKind, Fields, SharedStore};
use crate::utils::error::{StoreError, StoreResult};
use memory_store::MemoryConfigStore;
use sqlite_store::{SqliteConfigStore, SqliteStoreConfig};
use std::sync::Arc;

fn expected(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "integer",
        ColumnKind::Text => "string",
        ColumnKind::Json => "JSON text",
    }
}

/// Every key must name a column of `kind` and carry a value of its type.
pub(crate) fn check_fields(kind: EntityKind, fields: &Fields) -> StoreResult<()> {
    for (name, value) in fields {
        let column = kind.column(name)?;
        let matches = match column.kind {
            ColumnKind::Integer => value.is_i64(),
            ColumnKind::Text => value.is_string(),
            ColumnKind::Json => value
                .as_str()
                .is_some_and(|text| serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()),
        };
        if !matches {
            return Err(StoreError::FieldTypeError {
                kind,
                field: name.clone(),
                expected: expected(column.kind),
            });
        }
    }
    Ok(())
}

/// Field check for create/update. Ids are store-assigned; a create must carry
/// every required column.
pub(crate) fn check_writable(kind: EntityKind, fields: &Fields, creating: bool) -> StoreResult<()> {
    if fields.contains_key("id") {
        return Err(StoreError::ConstraintError {
            kind,
            message: "id is assigned by the store".to_string(),
        });
    }
    check_fields(kind, fields)?;
    if creating {
        if let Some(missing) = kind
            .columns()
            .iter()
            .find(|column| column.required && !fields.contains_key(column.name))
        {
            return Err(StoreError::ConstraintError {
                kind,
                message: format!("NOT NULL constraint failed: {}.{}", kind, missing.name),
            });
        }
    }
    Ok(())
}

/// The store selected by configuration, kept concrete so it can be closed on
/// shutdown.
#[derive(Clone)]
pub enum StoreHandle {
    Sqlite(SqliteConfigStore),
    Memory(MemoryConfigStore),
}

impl StoreHandle {
    pub fn open(config: &DatabaseConfig) -> StoreResult<Self> {
        match config.backend {
            StoreBackend::Sqlite => {
                let path = config.path.as_deref().ok_or_else(|| StoreError::Unavailable {
                    message: "sqlite backend requires database.path".to_string(),
                })?;
                let store = SqliteConfigStore::open(&SqliteStoreConfig {
                    path: path.into(),
                    busy_timeout_ms: config.busy_timeout_ms,
                })?;
                tracing::info!("🗄️ Opened SQLite store at {}", path);
                Ok(Self::Sqlite(store))
            }
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Using the in-memory store; configuration is lost on exit");
                Ok(Self::Memory(MemoryConfigStore::new()))
            }
        }
    }

    pub fn shared(&self) -> SharedStore {
        match self {
            Self::Sqlite(store) => Arc::new(store.clone()),
            Self::Memory(store) => Arc::new(store.clone()),
        }
    }

    pub fn close(self) -> StoreResult<()> {
        match self {
            Self::Sqlite(store) => store.close(),
            Self::Memory(_) => Ok(()),
        }
    }
}
