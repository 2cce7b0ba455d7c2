use crate::utils::error::{FakerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DATABASE_PATH_ENV: &str = "FAKER_DATABASE_PATH";
pub const JWT_SECRET_ENV: &str = "FAKER_JWT_SECRET";

pub const MIN_SECRET_BYTES: usize = 16;
pub const MIN_TOKEN_TTL_SECONDS: u64 = 60;
pub const MAX_TOKEN_TTL_SECONDS: u64 = 86_400;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FakerConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub path: Option<String>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: None,
            busy_timeout_ms: crate::adapters::sqlite_store::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_seconds: crate::adapters::jwt::DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

// Keeps the secret out of debug logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// A `${VAR}` placeholder whose variable was not set.
fn is_unresolved(value: &str) -> bool {
    value.trim_start().starts_with("${")
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl FakerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FakerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if it exists, otherwise starts from defaults. Environment
    /// fallbacks are applied either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Self::default()
        };
        config.apply_env_defaults();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FakerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| FakerError::ConfigError {
            message: format!("placeholder pattern failed to compile: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Fills the database path and JWT secret from the environment when the
    /// file leaves them unset or as unresolved placeholders.
    pub fn apply_env_defaults(&mut self) {
        if self.database.path.as_deref().map_or(true, is_unresolved) {
            self.database.path = non_empty_env(DATABASE_PATH_ENV);
        }
        if self.auth.jwt_secret.as_deref().map_or(true, is_unresolved) {
            self.auth.jwt_secret = non_empty_env(JWT_SECRET_ENV);
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind", &self.server.bind)?;

        if self.database.backend == StoreBackend::Sqlite {
            let path = self.database.path.as_deref().ok_or_else(|| {
                FakerError::validation(
                    "database.path",
                    format!("required for the sqlite backend (or set {})", DATABASE_PATH_ENV),
                )
            })?;
            validation::validate_path("database.path", path)?;
        }
        validation::validate_positive_number("database.busy_timeout_ms", self.database.busy_timeout_ms, 1)?;

        let secret = self.auth.jwt_secret.as_deref().ok_or_else(|| {
            FakerError::validation(
                "auth.jwt_secret",
                format!("a signing secret is required (or set {})", JWT_SECRET_ENV),
            )
        })?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(FakerError::validation(
                "auth.jwt_secret",
                format!("must be at least {} bytes", MIN_SECRET_BYTES),
            ));
        }
        validation::validate_range(
            "auth.token_ttl_seconds",
            self.auth.token_ttl_seconds,
            MIN_TOKEN_TTL_SECONDS,
            MAX_TOKEN_TTL_SECONDS,
        )?;

        validation::validate_non_empty_string("logging.level", &self.logging.level)?;

        Ok(())
    }

    pub fn jwt_secret(&self) -> Result<&str> {
        self.auth
            .jwt_secret
            .as_deref()
            .ok_or_else(|| FakerError::validation("auth.jwt_secret", "a signing secret is required"))
    }
}

impl Validate for FakerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
