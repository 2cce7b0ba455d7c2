use crate::adapters::password::{hash_password_blocking, verify_password_blocking};
use crate::api::envelope::Reply;
use crate::api::extract::{parse_body, parse_id, AuthenticatedAccount};
use crate::api::AppState;
use crate::domain::model::{AccountChanges, NewAccount};
use crate::domain::ports::EntityKind;
use crate::utils::error::{FakerError, Result};
use crate::utils::validation;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

const INVALID_LOGIN: &str = "invalid email or password";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn checked_email(email: &str) -> Result<String> {
    let email = normalize_email(email);
    validation::validate_non_empty_string("email", &email)?;
    validation::validate_email("email", &email)?;
    Ok(email)
}

/// Every `/api/account/{id}` route acts on the caller's own account only.
fn require_self(path_id: &str, account_id: i64) -> Result<i64> {
    let id = parse_id(path_id)?;
    if id != account_id {
        return Err(FakerError::unauthorized("accounts can only manage themselves"));
    }
    Ok(id)
}

async fn ensure_email_free(state: &AppState, email: &str, current: Option<i64>) -> Result<()> {
    if let Some(existing) = state.repository.find_account_by_email(email).await? {
        if Some(existing.id) != current {
            return Err(FakerError::Conflict {
                message: "an account with this email already exists".to_string(),
            });
        }
    }
    Ok(())
}

/// `POST /account`
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Reply> {
    let credentials = parse_body(payload)?;
    let email = checked_email(validation::validate_required_field("email", &credentials.email)?)?;
    let password = validation::validate_required_field("password", &credentials.password)?;
    validation::validate_password_strength("password", password)?;

    ensure_email_free(&state, &email, None).await?;
    let account = state
        .repository
        .create_account(&NewAccount {
            email,
            password: hash_password_blocking(password).await?,
        })
        .await?;

    tracing::info!(account_id = account.id, "👤 Account created");
    Reply::created("Account created successfully", &account)
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Reply> {
    let credentials = parse_body(payload)?;
    let email = normalize_email(validation::validate_required_field("email", &credentials.email)?);
    let password = validation::validate_required_field("password", &credentials.password)?;

    let account = state
        .repository
        .find_account_by_email(&email)
        .await?
        .ok_or_else(|| FakerError::unauthorized(INVALID_LOGIN))?;
    if !verify_password_blocking(password, &account.password).await? {
        tracing::debug!(account_id = account.id, "Login refused: wrong password");
        return Err(FakerError::unauthorized(INVALID_LOGIN));
    }

    let token = state.authenticator.issue(&account)?;
    Reply::ok("Login successful", &json!({ "token": token }))
}

/// `GET /api/account`
pub async fn current(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
) -> Result<Reply> {
    let account = state.repository.account(account_id).await?;
    Reply::ok("Account retrieved successfully", &account)
}

/// `GET /api/account/{id}`
pub async fn get(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let id = require_self(&id, account_id)?;
    let account = state.repository.account(id).await?;
    Reply::ok("Account retrieved successfully", &account)
}

/// `PUT /api/account/{id}`: change email, rotate password, or both.
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Reply> {
    let id = require_self(&id, account_id)?;
    let credentials = parse_body(payload)?;
    if credentials.email.is_none() && credentials.password.is_none() {
        return Err(FakerError::validation("body", "provide an email or a password to update"));
    }

    let mut changes = AccountChanges::default();
    if let Some(email) = &credentials.email {
        let email = checked_email(email)?;
        ensure_email_free(&state, &email, Some(id)).await?;
        changes.email = Some(email);
    }
    if let Some(password) = &credentials.password {
        validation::validate_password_strength("password", password)?;
        changes.password = Some(hash_password_blocking(password).await?);
    }

    let account = state.repository.update_account(id, &changes).await?;
    Reply::ok("Account updated successfully", &account)
}

/// `DELETE /api/account/{id}`: removes the account and everything it owns.
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let id = require_self(&id, account_id)?;
    state.repository.delete(EntityKind::Account, id).await?;
    tracing::info!(account_id = id, "🗑️ Account deleted");
    Ok(Reply::message("Account deleted successfully"))
}
