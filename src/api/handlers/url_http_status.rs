use crate::api::envelope::{PageQuery, Reply};
use crate::api::extract::{parse_body, parse_id, parse_query, AuthenticatedAccount};
use crate::api::AppState;
use crate::core::selector::PERCENT_SCALE;
use crate::domain::model::UrlHttpStatusFields;
use crate::domain::ports::EntityKind;
use crate::utils::error::{FakerError, Result};
use crate::utils::validation;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

pub const MIN_HTTP_STATUS: i64 = 100;
pub const MAX_HTTP_STATUS: i64 = 599;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub url_id: Option<i64>,
    pub http_status: Option<i64>,
    pub percentage: Option<i64>,
}

impl StatusPayload {
    fn into_fields(self) -> Result<UrlHttpStatusFields> {
        let url_id = validation::validate_id("url_id", *validation::validate_required_field("url_id", &self.url_id)?)?;

        let http_status = *validation::validate_required_field("http_status", &self.http_status)?;
        validation::validate_range("http_status", http_status, MIN_HTTP_STATUS, MAX_HTTP_STATUS)?;

        let percentage = *validation::validate_required_field("percentage", &self.percentage)?;
        validation::validate_range("percentage", percentage, 0, i64::from(PERCENT_SCALE))?;

        Ok(UrlHttpStatusFields {
            url_id,
            http_status: u16::try_from(http_status)
                .map_err(|_| FakerError::validation("http_status", "out of range"))?,
            percentage: u32::try_from(percentage)
                .map_err(|_| FakerError::validation("percentage", "out of range"))?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub url_id: Option<i64>,
}

/// The statuses of one URL config may not claim more than 100% in total.
/// `replacing` is excluded from the sum so an update does not count itself.
///
/// Check and write are not atomic: two concurrent writes for the same config
/// can both pass and leave it above 100%. Selection still terminates in that
/// case, biased toward the earlier statuses.
async fn ensure_percentage_fits(
    state: &AppState,
    fields: &UrlHttpStatusFields,
    replacing: Option<i64>,
) -> Result<()> {
    let allocated: u64 = state
        .repository
        .statuses_for(fields.url_id)
        .await?
        .iter()
        .filter(|status| Some(status.id) != replacing)
        .map(|status| u64::from(status.percentage))
        .sum();
    let total = allocated + u64::from(fields.percentage);

    if total > u64::from(PERCENT_SCALE) {
        return Err(FakerError::validation(
            "percentage",
            format!(
                "total percentage for URL config {} would be {}%, exceeding {}% ({}% already allocated)",
                fields.url_id, total, PERCENT_SCALE, allocated
            ),
        ));
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    payload: std::result::Result<Json<StatusPayload>, JsonRejection>,
) -> Result<Reply> {
    let fields = parse_body(payload)?.into_fields()?;
    state.authorizer.require_url_config(fields.url_id, account_id).await?;
    ensure_percentage_fits(&state, &fields, None).await?;

    let status = state.repository.create_status(&fields).await?;
    tracing::info!(
        status_id = status.id,
        url_id = status.url_id,
        "📊 HTTP status {} created at {}%",
        status.http_status,
        status.percentage
    );
    Reply::created("HTTP status created successfully", &status)
}

/// `GET /api/url_http_status[?url_id=]`
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    filter: std::result::Result<Query<StatusFilter>, QueryRejection>,
    page: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Reply> {
    let filter = parse_query(filter)?;
    let page = parse_query(page)?;

    let statuses = match filter.url_id {
        Some(url_id) => {
            state.authorizer.require_url_config(url_id, account_id).await?;
            state.repository.statuses_for(url_id).await?
        }
        None => state.repository.statuses_owned_by(account_id).await?,
    };
    Reply::page("HTTP statuses retrieved successfully", statuses, &page)
}

pub async fn get(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let status = state.authorizer.require_status(parse_id(&id)?, account_id).await?;
    Reply::ok("HTTP status retrieved successfully", &status)
}

pub async fn update(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
    payload: std::result::Result<Json<StatusPayload>, JsonRejection>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    let fields = parse_body(payload)?.into_fields()?;
    state.authorizer.require_status(id, account_id).await?;
    state.authorizer.require_url_config(fields.url_id, account_id).await?;
    ensure_percentage_fits(&state, &fields, Some(id)).await?;

    let status = state.repository.update_status(id, &fields).await?;
    Reply::ok("HTTP status updated successfully", &status)
}

pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    state.authorizer.require_status(id, account_id).await?;
    state.repository.delete(EntityKind::UrlHttpStatus, id).await?;
    Ok(Reply::message("HTTP status deleted successfully"))
}
