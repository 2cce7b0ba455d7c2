pub mod account;
pub mod health;
pub mod mock;
pub mod project;
pub mod response_model;
pub mod url_config;
pub mod url_http_status;

use crate::utils::validation;
use crate::utils::error::Result;

pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Descriptions are optional; absent means empty.
pub(crate) fn description(value: Option<String>) -> Result<String> {
    let value = value.unwrap_or_default();
    validation::validate_max_length("description", &value, MAX_DESCRIPTION_LENGTH)?;
    Ok(value)
}
