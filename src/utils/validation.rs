use crate::utils::error::{FakerError, Result};
use regex::Regex;
use std::net::SocketAddr;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<SocketAddr> {
    if addr.trim().is_empty() {
        return Err(FakerError::validation(field_name, "Address cannot be empty"));
    }

    addr.parse::<SocketAddr>()
        .map_err(|e| FakerError::validation(field_name, format!("Invalid socket address: {}", e)))
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(FakerError::validation(field_name, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(FakerError::validation(field_name, "Path contains null bytes"));
    }

    Ok(())
}

/// Mocked URL paths are matched verbatim and must be absolute.
pub fn validate_url_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    if !path.starts_with('/') {
        return Err(FakerError::validation(field_name, "path must start with '/'"));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(FakerError::validation(
            field_name,
            "path cannot contain whitespace",
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(FakerError::validation(
            field_name,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// Identifiers arrive as signed integers from JSON and paths; only positive ones exist.
pub fn validate_id(field_name: &str, id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(FakerError::validation(
            field_name,
            format!("{} is required and must be a positive integer", field_name),
        ));
    }
    Ok(id)
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| FakerError::validation(field_name, format!("{} is required", field_name)))
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FakerError::validation(
            field_name,
            format!("{} is required", field_name),
        ));
    }
    Ok(())
}

pub fn validate_min_length(field_name: &str, value: &str, min: usize) -> Result<()> {
    if value.chars().count() < min {
        return Err(FakerError::validation(
            field_name,
            format!("{} must be at least {} characters long", field_name, min),
        ));
    }
    Ok(())
}

pub fn validate_max_length(field_name: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(FakerError::validation(
            field_name,
            format!("{} cannot be longer than {} characters", field_name, max),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FakerError::validation(
            field_name,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_email(field_name: &str, email: &str) -> Result<()> {
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| FakerError::ConfigError {
            message: format!("email pattern failed to compile: {}", e),
        })?;

    if !re.is_match(email) {
        return Err(FakerError::validation(field_name, "invalid email format"));
    }
    Ok(())
}

pub fn validate_password_strength(field_name: &str, password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(long_enough && has_upper && has_lower && has_digit && has_symbol) {
        return Err(FakerError::validation(
            field_name,
            format!(
                "password must be at least {} characters long, contain an upper-case letter, \
                 a lower-case letter, a number, and a special character",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }
    Ok(())
}
