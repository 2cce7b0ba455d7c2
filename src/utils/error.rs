use crate::domain::ports::EntityKind;
use thiserror::Error;

/// Failures raised by a [`ConfigStore`](crate::domain::ports::ConfigStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("{kind} record {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("Constraint violation on {kind}: {message}")]
    ConstraintError { kind: EntityKind, message: String },

    #[error("Unknown field '{field}' for {kind}")]
    UnknownField { kind: EntityKind, field: String },

    #[error("Field '{field}' of {kind} has the wrong type: expected {expected}")]
    FieldTypeError {
        kind: EntityKind,
        field: String,
        expected: &'static str,
    },

    #[error("Failed to decode {kind} record: {message}")]
    DecodeError { kind: EntityKind, message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Error, Debug)]
pub enum FakerError {
    #[error("Validation error on '{field}': {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: i64 },

    #[error("URL not configured for mocking: {method} {path}")]
    NotConfigured { method: String, path: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Configuration integrity error: {message}")]
    ConfigurationIntegrityError { message: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(StoreError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Credential processing error: {message}")]
    CredentialError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something we refuse to act on.
    Client,
    Authorization,
    /// Stored configuration is inconsistent or the service is misconfigured.
    Configuration,
    Infrastructure,
}

impl FakerError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. }
            | Self::NotFound { .. }
            | Self::NotConfigured { .. }
            | Self::Conflict { .. } => ErrorCategory::Client,
            Self::Unauthorized { .. } => ErrorCategory::Authorization,
            Self::ConfigurationIntegrityError { .. } | Self::ConfigError { .. } => {
                ErrorCategory::Configuration
            }
            Self::BackendUnavailable(_)
            | Self::CredentialError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Infrastructure,
        }
    }

    /// HTTP status this error is reported with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::Unauthorized { .. } => 401,
            Self::NotFound { .. } | Self::NotConfigured { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::ConfigurationIntegrityError { .. }
            | Self::BackendUnavailable(_)
            | Self::ConfigError { .. }
            | Self::CredentialError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => 500,
        }
    }
}

impl From<StoreError> for FakerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound {
                entity: kind.to_string(),
                id,
            },
            StoreError::ConstraintError { kind, message } => Self::Conflict {
                message: format!("{} violates a store constraint: {}", kind, message),
            },
            other => Self::BackendUnavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FakerError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
