pub mod toml_config;

pub use toml_config::{FakerConfig, LogFormat, StoreBackend};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "api-faker")]
#[command(about = "Serve weighted mock responses for configured API routes")]
pub struct ServerArgs {
    #[arg(long, default_value = "api-faker.toml", help = "TOML config file (optional)")]
    pub config: String,

    #[arg(long, help = "Override server.bind")]
    pub bind: Option<String>,

    #[arg(long, help = "Override database.path (implies the sqlite backend)")]
    pub database: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ServerArgs {
    /// File (or defaults) first, then environment, then command-line flags.
    pub fn load_config(&self) -> Result<FakerConfig> {
        let mut config = FakerConfig::load_or_default(&self.config)?;

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(database) = &self.database {
            config.database.backend = StoreBackend::Sqlite;
            config.database.path = Some(database.clone());
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }

        Ok(config)
    }
}
