use crate::api::envelope::{PageQuery, Reply};
use crate::api::extract::{parse_body, parse_id, parse_query, AuthenticatedAccount};
use crate::api::handlers::description;
use crate::api::AppState;
use crate::domain::model::{MockBody, ResponseModelFields};
use crate::domain::ports::EntityKind;
use crate::utils::error::{FakerError, Result};
use crate::utils::validation;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponseModelPayload {
    pub url_http_status_id: Option<i64>,
    /// `null` deserializes to `None` and is rejected like a missing model.
    /// Anything else is kept as the exact text the client sent.
    pub model: Option<MockBody>,
    pub description: Option<String>,
}

impl ResponseModelPayload {
    fn into_fields(self) -> Result<ResponseModelFields> {
        let url_http_status_id = validation::validate_id(
            "url_http_status_id",
            *validation::validate_required_field("url_http_status_id", &self.url_http_status_id)?,
        )?;
        let model = self
            .model
            .ok_or_else(|| FakerError::validation("model", "model is required"))?;

        Ok(ResponseModelFields {
            url_http_status_id,
            model,
            description: description(self.description)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseModelFilter {
    pub url_http_status_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    payload: std::result::Result<Json<ResponseModelPayload>, JsonRejection>,
) -> Result<Reply> {
    let fields = parse_body(payload)?.into_fields()?;
    state
        .authorizer
        .require_status(fields.url_http_status_id, account_id)
        .await?;

    let model = state.repository.create_response_model(&fields).await?;
    tracing::info!(
        response_model_id = model.id,
        status_id = model.url_http_status_id,
        "🧾 Response model created"
    );
    Reply::created("Response model created successfully", &model)
}

/// `GET /api/response_model[?url_http_status_id=]`
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    filter: std::result::Result<Query<ResponseModelFilter>, QueryRejection>,
    page: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Reply> {
    let filter = parse_query(filter)?;
    let page = parse_query(page)?;

    let models = match filter.url_http_status_id {
        Some(status_id) => {
            state.authorizer.require_status(status_id, account_id).await?;
            state.repository.response_models_for(status_id).await?
        }
        None => state.repository.response_models_owned_by(account_id).await?,
    };
    Reply::page("Response models retrieved successfully", models, &page)
}

pub async fn get(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let model = state
        .authorizer
        .require_response_model(parse_id(&id)?, account_id)
        .await?;
    Reply::ok("Response model retrieved successfully", &model)
}

pub async fn update(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ResponseModelPayload>, JsonRejection>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    let fields = parse_body(payload)?.into_fields()?;
    state.authorizer.require_response_model(id, account_id).await?;
    state
        .authorizer
        .require_status(fields.url_http_status_id, account_id)
        .await?;

    let model = state.repository.update_response_model(id, &fields).await?;
    Reply::ok("Response model updated successfully", &model)
}

pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    state.authorizer.require_response_model(id, account_id).await?;
    state.repository.delete(EntityKind::ResponseModel, id).await?;
    Ok(Reply::message("Response model deleted successfully"))
}
