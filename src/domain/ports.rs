use crate::utils::error::{Result, StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Flat field map exchanged with the store, keyed by column name.
pub type Fields = serde_json::Map<String, Value>;

pub type SharedStore = Arc<dyn ConfigStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Project,
    UrlConfig,
    UrlHttpStatus,
    ResponseModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// JSON document exchanged as its exact text and persisted unparsed.
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

const fn column(name: &'static str, kind: ColumnKind, required: bool) -> Column {
    Column {
        name,
        kind,
        required,
    }
}

const ACCOUNT_COLUMNS: &[Column] = &[
    column("id", ColumnKind::Integer, false),
    column("email", ColumnKind::Text, true),
    column("password", ColumnKind::Text, true),
];

const PROJECT_COLUMNS: &[Column] = &[
    column("id", ColumnKind::Integer, false),
    column("name", ColumnKind::Text, true),
    column("description", ColumnKind::Text, false),
    column("owner_id", ColumnKind::Integer, true),
];

const URL_CONFIG_COLUMNS: &[Column] = &[
    column("id", ColumnKind::Integer, false),
    column("path", ColumnKind::Text, true),
    column("method", ColumnKind::Text, true),
    column("description", ColumnKind::Text, false),
    column("project_id", ColumnKind::Integer, true),
];

const URL_HTTP_STATUS_COLUMNS: &[Column] = &[
    column("id", ColumnKind::Integer, false),
    column("url_id", ColumnKind::Integer, true),
    column("http_status", ColumnKind::Integer, true),
    column("percentage", ColumnKind::Integer, true),
];

const RESPONSE_MODEL_COLUMNS: &[Column] = &[
    column("id", ColumnKind::Integer, false),
    column("url_http_status_id", ColumnKind::Integer, true),
    column("model", ColumnKind::Json, true),
    column("description", ColumnKind::Text, false),
];

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Account,
        EntityKind::Project,
        EntityKind::UrlConfig,
        EntityKind::UrlHttpStatus,
        EntityKind::ResponseModel,
    ];

    /// Table name, also the external entity-kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Account => "account",
            EntityKind::Project => "project",
            EntityKind::UrlConfig => "url_config",
            EntityKind::UrlHttpStatus => "url_http_status",
            EntityKind::ResponseModel => "response_model",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            EntityKind::Account => ACCOUNT_COLUMNS,
            EntityKind::Project => PROJECT_COLUMNS,
            EntityKind::UrlConfig => URL_CONFIG_COLUMNS,
            EntityKind::UrlHttpStatus => URL_HTTP_STATUS_COLUMNS,
            EntityKind::ResponseModel => RESPONSE_MODEL_COLUMNS,
        }
    }

    pub fn column(self, name: &str) -> StoreResult<&'static Column> {
        self.columns()
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| StoreError::UnknownField {
                kind: self,
                field: name.to_string(),
            })
    }

    /// Owning entity and the foreign-key column pointing at it.
    pub fn parent(self) -> Option<(EntityKind, &'static str)> {
        match self {
            EntityKind::Account => None,
            EntityKind::Project => Some((EntityKind::Account, "owner_id")),
            EntityKind::UrlConfig => Some((EntityKind::Project, "project_id")),
            EntityKind::UrlHttpStatus => Some((EntityKind::UrlConfig, "url_id")),
            EntityKind::ResponseModel => Some((EntityKind::UrlHttpStatus, "url_http_status_id")),
        }
    }

    /// Entities removed together with a row of this kind.
    pub fn children(self) -> impl Iterator<Item = (EntityKind, &'static str)> {
        EntityKind::ALL.into_iter().filter_map(move |kind| {
            kind.parent()
                .filter(|(parent, _)| *parent == self)
                .map(|(_, fk)| (kind, fk))
        })
    }

    pub fn unique_keys(self) -> &'static [&'static [&'static str]] {
        match self {
            EntityKind::Account => &[&["email"]],
            EntityKind::UrlConfig => &[&["project_id", "path", "method"]],
            _ => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored row. `data` always carries the `id` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Fields,
}

impl Record {
    pub fn new(data: Fields) -> Self {
        Self { data }
    }

    pub fn id(&self) -> Option<i64> {
        self.data.get("id").and_then(Value::as_i64)
    }

    pub fn decode<T: DeserializeOwned>(self, kind: EntityKind) -> StoreResult<T> {
        serde_json::from_value(Value::Object(self.data)).map_err(|e| StoreError::DecodeError {
            kind,
            message: e.to_string(),
        })
    }
}

/// Serializes a typed value into a store field map.
pub fn to_fields<T: Serialize>(kind: EntityKind, value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::DecodeError {
            kind,
            message: format!("expected an object of fields, got {}", other),
        }),
        Err(e) => Err(StoreError::DecodeError {
            kind,
            message: e.to_string(),
        }),
    }
}

/// Generic key-based CRUD over the configuration tables. No joins: multi-hop
/// lookups are composed from sequential `list` calls by the caller.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn create(&self, kind: EntityKind, fields: Fields) -> StoreResult<Record>;

    async fn read(&self, kind: EntityKind, id: i64) -> StoreResult<Record>;

    /// Rows whose columns equal every filter entry, ordered by id. An empty
    /// filter lists the whole table.
    async fn list(&self, kind: EntityKind, filter: Fields) -> StoreResult<Vec<Record>>;

    async fn update(&self, kind: EntityKind, id: i64, fields: Fields) -> StoreResult<Record>;

    async fn delete(&self, kind: EntityKind, id: i64) -> StoreResult<()>;
}

/// Turns a bearer credential into the account it was issued to.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> Result<i64>;
}

/// Source of uniformly distributed rolls in `[0, 100)`.
pub trait RollSource: Send + Sync {
    fn roll(&self) -> u32;
}
