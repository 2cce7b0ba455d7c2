//! Hierarchical ownership checks: account → project → URL config → status →
//! response model.
//!
//! A row that does not exist is indistinguishable from a row owned by someone
//! else; both answer `false`. Store failures are errors, never `false`.

use crate::core::repository::ConfigRepository;
use crate::domain::model::{Project, ResponseModel, UrlConfig, UrlHttpStatus};
use crate::utils::error::{FakerError, Result};

const ACCESS_DENIED: &str = "resource does not exist or belongs to another account";

fn denied() -> FakerError {
    FakerError::unauthorized(ACCESS_DENIED)
}

#[derive(Clone)]
pub struct OwnershipAuthorizer {
    repository: ConfigRepository,
}

impl OwnershipAuthorizer {
    pub fn new(repository: ConfigRepository) -> Self {
        Self { repository }
    }

    async fn owned_project(&self, project_id: i64, account_id: i64) -> Result<Option<Project>> {
        if project_id <= 0 || account_id <= 0 {
            return Ok(None);
        }
        self.repository.owned_project(project_id, account_id).await
    }

    async fn owned_url_config(&self, url_config_id: i64, account_id: i64) -> Result<Option<UrlConfig>> {
        let Some(config) = self.repository.find_url_config(url_config_id).await? else {
            return Ok(None);
        };
        let owned = self.owned_project(config.project_id, account_id).await?;
        Ok(owned.map(|_| config))
    }

    async fn owned_status(&self, status_id: i64, account_id: i64) -> Result<Option<UrlHttpStatus>> {
        let Some(status) = self.repository.find_status(status_id).await? else {
            return Ok(None);
        };
        let owned = self.owned_url_config(status.url_id, account_id).await?;
        Ok(owned.map(|_| status))
    }

    async fn owned_response_model(
        &self,
        model_id: i64,
        account_id: i64,
    ) -> Result<Option<ResponseModel>> {
        let Some(model) = self.repository.find_response_model(model_id).await? else {
            return Ok(None);
        };
        let owned = self.owned_status(model.url_http_status_id, account_id).await?;
        Ok(owned.map(|_| model))
    }

    pub async fn authorize_project(&self, project_id: i64, account_id: i64) -> Result<bool> {
        Ok(self.owned_project(project_id, account_id).await?.is_some())
    }

    pub async fn authorize_url_config(&self, url_config_id: i64, account_id: i64) -> Result<bool> {
        Ok(self.owned_url_config(url_config_id, account_id).await?.is_some())
    }

    pub async fn authorize_status(&self, status_id: i64, account_id: i64) -> Result<bool> {
        Ok(self.owned_status(status_id, account_id).await?.is_some())
    }

    pub async fn authorize_response_model(&self, model_id: i64, account_id: i64) -> Result<bool> {
        Ok(self.owned_response_model(model_id, account_id).await?.is_some())
    }

    /// Like [`authorize_project`](Self::authorize_project) but hands back the
    /// project, or `Unauthorized`.
    pub async fn require_project(&self, project_id: i64, account_id: i64) -> Result<Project> {
        self.owned_project(project_id, account_id)
            .await?
            .ok_or_else(denied)
    }

    pub async fn require_url_config(&self, url_config_id: i64, account_id: i64) -> Result<UrlConfig> {
        self.owned_url_config(url_config_id, account_id)
            .await?
            .ok_or_else(denied)
    }

    pub async fn require_status(&self, status_id: i64, account_id: i64) -> Result<UrlHttpStatus> {
        self.owned_status(status_id, account_id)
            .await?
            .ok_or_else(denied)
    }

    pub async fn require_response_model(
        &self,
        model_id: i64,
        account_id: i64,
    ) -> Result<ResponseModel> {
        self.owned_response_model(model_id, account_id)
            .await?
            .ok_or_else(denied)
    }
}
