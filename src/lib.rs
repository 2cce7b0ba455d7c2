pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::ServerArgs;

pub use adapters::StoreHandle;
pub use api::{router, AppState};
pub use config::FakerConfig;
pub use core::{MockRequest, MockResolver, ResolvedMock};
pub use utils::error::{FakerError, Result};
