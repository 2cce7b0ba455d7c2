use crate::api::envelope::{PageQuery, Reply};
use crate::api::extract::{parse_body, parse_id, parse_query, AuthenticatedAccount};
use crate::api::handlers::description;
use crate::api::AppState;
use crate::domain::model::{HttpMethod, UrlConfigFields};
use crate::domain::ports::EntityKind;
use crate::utils::error::{FakerError, Result};
use crate::utils::validation;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UrlConfigPayload {
    pub path: Option<String>,
    pub method: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<i64>,
}

impl UrlConfigPayload {
    fn into_fields(self) -> Result<UrlConfigFields> {
        let path = validation::validate_required_field("path", &self.path)?.trim().to_string();
        validation::validate_url_path("path", &path)?;
        let method: HttpMethod = validation::validate_required_field("method", &self.method)?.parse()?;
        let project_id =
            validation::validate_id("project_id", *validation::validate_required_field("project_id", &self.project_id)?)?;

        Ok(UrlConfigFields {
            path,
            method,
            description: description(self.description)?,
            project_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlConfigFilter {
    pub project_id: Option<i64>,
}

/// One route per `(project, path, method)`. The store enforces this too; the
/// check here gives a clearer message.
async fn ensure_route_free(state: &AppState, fields: &UrlConfigFields, current: Option<i64>) -> Result<()> {
    let clash = state
        .repository
        .url_configs_matching(fields.project_id, &fields.path, fields.method.as_str())
        .await?
        .into_iter()
        .any(|config| Some(config.id) != current);
    if clash {
        return Err(FakerError::Conflict {
            message: format!(
                "{} {} is already configured in project {}",
                fields.method, fields.path, fields.project_id
            ),
        });
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    payload: std::result::Result<Json<UrlConfigPayload>, JsonRejection>,
) -> Result<Reply> {
    let fields = parse_body(payload)?.into_fields()?;
    state.authorizer.require_project(fields.project_id, account_id).await?;
    ensure_route_free(&state, &fields, None).await?;

    let config = state.repository.create_url_config(&fields).await?;
    tracing::info!(
        url_config_id = config.id,
        project_id = config.project_id,
        "🔗 URL config created: {} {}",
        config.method,
        config.path
    );
    Reply::created("URL config created successfully", &config)
}

/// `GET /api/url_config[?project_id=]`
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    filter: std::result::Result<Query<UrlConfigFilter>, QueryRejection>,
    page: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Reply> {
    let filter = parse_query(filter)?;
    let page = parse_query(page)?;

    let configs = match filter.project_id {
        Some(project_id) => {
            state.authorizer.require_project(project_id, account_id).await?;
            state.repository.url_configs_in_project(project_id).await?
        }
        None => state.repository.url_configs_owned_by(account_id).await?,
    };
    Reply::page("URL configs retrieved successfully", configs, &page)
}

pub async fn get(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let config = state.authorizer.require_url_config(parse_id(&id)?, account_id).await?;
    Reply::ok("URL config retrieved successfully", &config)
}

/// May move the config to another project, which the caller must also own.
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UrlConfigPayload>, JsonRejection>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    let fields = parse_body(payload)?.into_fields()?;
    state.authorizer.require_url_config(id, account_id).await?;
    state.authorizer.require_project(fields.project_id, account_id).await?;
    ensure_route_free(&state, &fields, Some(id)).await?;

    let config = state.repository.update_url_config(id, &fields).await?;
    Reply::ok("URL config updated successfully", &config)
}

pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    state.authorizer.require_url_config(id, account_id).await?;
    state.repository.delete(EntityKind::UrlConfig, id).await?;
    Ok(Reply::message("URL config deleted successfully"))
}
