use crate::core::authorizer::OwnershipAuthorizer;
use crate::core::repository::ConfigRepository;
use crate::core::selector::select_status;
use crate::domain::model::MockBody;
use crate::domain::ports::{RollSource, SharedStore};
use crate::utils::error::{FakerError, Result};
use std::sync::Arc;

/// An inbound mocked call, already stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub project_id: i64,
}

impl MockRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>, project_id: i64) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            project_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMock {
    pub status_code: u16,
    pub body: MockBody,
    pub status_id: i64,
    pub response_model_id: i64,
}

/// Decides which status and body a mocked request receives. Holds no state
/// besides the store handle; every call re-reads the configuration.
#[derive(Clone)]
pub struct MockResolver {
    repository: ConfigRepository,
    authorizer: OwnershipAuthorizer,
    rolls: Arc<dyn RollSource>,
}

impl MockResolver {
    pub fn new(store: SharedStore, rolls: Arc<dyn RollSource>) -> Self {
        let repository = ConfigRepository::new(store);
        Self {
            authorizer: OwnershipAuthorizer::new(repository.clone()),
            repository,
            rolls,
        }
    }

    pub async fn resolve(&self, request: &MockRequest, account_id: i64) -> Result<ResolvedMock> {
        let method = request.method.trim().to_ascii_uppercase();
        let not_configured = || FakerError::NotConfigured {
            method: method.clone(),
            path: request.path.clone(),
        };

        // Ownership before lookup, so an unowned project never reveals its URLs.
        if !self
            .authorizer
            .authorize_project(request.project_id, account_id)
            .await?
        {
            tracing::debug!(
                project_id = request.project_id,
                account_id,
                "Mock request refused: project not owned by caller"
            );
            return Err(FakerError::unauthorized(
                "project does not exist or belongs to another account",
            ));
        }

        let configs = self
            .repository
            .url_configs_matching(request.project_id, &request.path, &method)
            .await?;
        let config = match configs.as_slice() {
            [] => return Err(not_configured()),
            [only] => only,
            [first, ..] => {
                tracing::warn!(
                    project_id = request.project_id,
                    method = %method,
                    path = %request.path,
                    matches = configs.len(),
                    "⚠️ Duplicate URL configs for one route, using id {}",
                    first.id
                );
                first
            }
        };

        let statuses = self.repository.statuses_for(config.id).await?;
        let roll = self.rolls.roll();
        let status = select_status(&statuses, roll).ok_or_else(not_configured)?;

        let models = self.repository.response_models_for(status.id).await?;
        let Some(model) = models.first() else {
            tracing::warn!(
                url_config_id = config.id,
                status_id = status.id,
                "⚠️ Selected status has no response model"
            );
            return Err(FakerError::ConfigurationIntegrityError {
                message: format!(
                    "status {} ({}) of {} {} has no response model",
                    status.id, status.http_status, method, request.path
                ),
            });
        };

        tracing::debug!(
            project_id = request.project_id,
            method = %method,
            path = %request.path,
            roll,
            status = status.http_status,
            response_model_id = model.id,
            "Mock resolved"
        );

        Ok(ResolvedMock {
            status_code: status.http_status,
            body: model.model.clone(),
            status_id: status.id,
            response_model_id: model.id,
        })
    }
}
