//! Typed access to the configuration tables.
//!
//! Every multi-hop lookup is a sequence of single-table `list` calls; the
//! store never joins.

use crate::domain::model::{
    Account, AccountChanges, NewAccount, NewProject, Project, ProjectChanges, ResponseModel,
    ResponseModelFields, UrlConfig, UrlConfigFields, UrlHttpStatus, UrlHttpStatusFields,
};
use crate::domain::ports::{to_fields, EntityKind, Fields, SharedStore};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

fn filter<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[derive(Clone)]
pub struct ConfigRepository {
    store: SharedStore,
}

impl ConfigRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    async fn list_as<T: DeserializeOwned>(&self, kind: EntityKind, filter: Fields) -> Result<Vec<T>> {
        let records = self.store.list(kind, filter).await?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push(record.decode(kind)?);
        }
        Ok(items)
    }

    /// Looks a row up through `list`, so absence is `None` rather than an error.
    async fn find_as<T: DeserializeOwned>(&self, kind: EntityKind, id: i64) -> Result<Option<T>> {
        Ok(self
            .list_as(kind, filter([("id", Value::from(id))]))
            .await?
            .into_iter()
            .next())
    }

    async fn create_as<T: DeserializeOwned, F: Serialize>(&self, kind: EntityKind, fields: &F) -> Result<T> {
        let record = self.store.create(kind, to_fields(kind, fields)?).await?;
        Ok(record.decode(kind)?)
    }

    async fn update_as<T: DeserializeOwned, F: Serialize>(
        &self,
        kind: EntityKind,
        id: i64,
        fields: &F,
    ) -> Result<T> {
        let record = self.store.update(kind, id, to_fields(kind, fields)?).await?;
        Ok(record.decode(kind)?)
    }

    pub async fn delete(&self, kind: EntityKind, id: i64) -> Result<()> {
        self.store.delete(kind, id).await?;
        Ok(())
    }

    // accounts

    pub async fn account(&self, id: i64) -> Result<Account> {
        Ok(self.store.read(EntityKind::Account, id).await?.decode(EntityKind::Account)?)
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .list_as(EntityKind::Account, filter([("email", Value::from(email))]))
            .await?
            .into_iter()
            .next())
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        self.create_as(EntityKind::Account, account).await
    }

    pub async fn update_account(&self, id: i64, changes: &AccountChanges) -> Result<Account> {
        self.update_as(EntityKind::Account, id, changes).await
    }

    // projects

    pub async fn find_project(&self, id: i64) -> Result<Option<Project>> {
        self.find_as(EntityKind::Project, id).await
    }

    /// The project, if it exists and belongs to `owner_id`.
    pub async fn owned_project(&self, id: i64, owner_id: i64) -> Result<Option<Project>> {
        Ok(self
            .list_as(
                EntityKind::Project,
                filter([("id", Value::from(id)), ("owner_id", Value::from(owner_id))]),
            )
            .await?
            .into_iter()
            .next())
    }

    pub async fn projects_owned_by(&self, owner_id: i64) -> Result<Vec<Project>> {
        self.list_as(EntityKind::Project, filter([("owner_id", Value::from(owner_id))]))
            .await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project> {
        self.create_as(EntityKind::Project, project).await
    }

    pub async fn update_project(&self, id: i64, changes: &ProjectChanges) -> Result<Project> {
        self.update_as(EntityKind::Project, id, changes).await
    }

    // url configs

    pub async fn find_url_config(&self, id: i64) -> Result<Option<UrlConfig>> {
        self.find_as(EntityKind::UrlConfig, id).await
    }

    /// Exact `(project, path, method)` match. `method` is compared verbatim,
    /// so callers pass it upper-cased.
    pub async fn url_configs_matching(
        &self,
        project_id: i64,
        path: &str,
        method: &str,
    ) -> Result<Vec<UrlConfig>> {
        self.list_as(
            EntityKind::UrlConfig,
            filter([
                ("project_id", Value::from(project_id)),
                ("path", Value::from(path)),
                ("method", Value::from(method)),
            ]),
        )
        .await
    }

    pub async fn url_configs_in_project(&self, project_id: i64) -> Result<Vec<UrlConfig>> {
        self.list_as(EntityKind::UrlConfig, filter([("project_id", Value::from(project_id))]))
            .await
    }

    pub async fn url_configs_owned_by(&self, owner_id: i64) -> Result<Vec<UrlConfig>> {
        let mut configs = Vec::new();
        for project in self.projects_owned_by(owner_id).await? {
            configs.extend(self.url_configs_in_project(project.id).await?);
        }
        Ok(configs)
    }

    pub async fn create_url_config(&self, config: &UrlConfigFields) -> Result<UrlConfig> {
        self.create_as(EntityKind::UrlConfig, config).await
    }

    pub async fn update_url_config(&self, id: i64, config: &UrlConfigFields) -> Result<UrlConfig> {
        self.update_as(EntityKind::UrlConfig, id, config).await
    }

    // statuses

    pub async fn find_status(&self, id: i64) -> Result<Option<UrlHttpStatus>> {
        self.find_as(EntityKind::UrlHttpStatus, id).await
    }

    /// Statuses of one URL config, in id order.
    pub async fn statuses_for(&self, url_id: i64) -> Result<Vec<UrlHttpStatus>> {
        self.list_as(EntityKind::UrlHttpStatus, filter([("url_id", Value::from(url_id))]))
            .await
    }

    pub async fn statuses_owned_by(&self, owner_id: i64) -> Result<Vec<UrlHttpStatus>> {
        let mut statuses = Vec::new();
        for config in self.url_configs_owned_by(owner_id).await? {
            statuses.extend(self.statuses_for(config.id).await?);
        }
        Ok(statuses)
    }

    pub async fn create_status(&self, status: &UrlHttpStatusFields) -> Result<UrlHttpStatus> {
        self.create_as(EntityKind::UrlHttpStatus, status).await
    }

    pub async fn update_status(&self, id: i64, status: &UrlHttpStatusFields) -> Result<UrlHttpStatus> {
        self.update_as(EntityKind::UrlHttpStatus, id, status).await
    }

    // response models

    pub async fn find_response_model(&self, id: i64) -> Result<Option<ResponseModel>> {
        self.find_as(EntityKind::ResponseModel, id).await
    }

    pub async fn response_models_for(&self, status_id: i64) -> Result<Vec<ResponseModel>> {
        self.list_as(
            EntityKind::ResponseModel,
            filter([("url_http_status_id", Value::from(status_id))]),
        )
        .await
    }

    pub async fn response_models_owned_by(&self, owner_id: i64) -> Result<Vec<ResponseModel>> {
        let mut models = Vec::new();
        for status in self.statuses_owned_by(owner_id).await? {
            models.extend(self.response_models_for(status.id).await?);
        }
        Ok(models)
    }

    pub async fn create_response_model(&self, model: &ResponseModelFields) -> Result<ResponseModel> {
        self.create_as(EntityKind::ResponseModel, model).await
    }

    pub async fn update_response_model(
        &self,
        id: i64,
        model: &ResponseModelFields,
    ) -> Result<ResponseModel> {
        self.update_as(EntityKind::ResponseModel, id, model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryConfigStore;
    use crate::domain::model::HttpMethod;
    use crate::utils::error::FakerError;
    use serde_json::json;
    use std::sync::Arc;

    fn repository() -> ConfigRepository {
        ConfigRepository::new(Arc::new(MemoryConfigStore::new()))
    }

    async fn account(repo: &ConfigRepository, email: &str) -> Account {
        repo.create_account(&NewAccount {
            email: email.to_string(),
            password: "hash".to_string(),
        })
        .await
        .unwrap()
    }

    async fn project(repo: &ConfigRepository, owner_id: i64) -> Project {
        repo.create_project(&NewProject {
            name: "Storefront".to_string(),
            description: String::new(),
            owner_id,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_owned_project_requires_matching_owner() {
        let repo = repository();
        let alice = account(&repo, "alice@example.com").await;
        let bob = account(&repo, "bob@example.com").await;
        let project = project(&repo, alice.id).await;

        assert!(repo.owned_project(project.id, alice.id).await.unwrap().is_some());
        assert!(repo.owned_project(project.id, bob.id).await.unwrap().is_none());
        assert!(repo.owned_project(999, alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_url_configs_matching_is_exact() {
        let repo = repository();
        let owner = account(&repo, "owner@example.com").await;
        let project = project(&repo, owner.id).await;

        repo.create_url_config(&UrlConfigFields {
            path: "/users".to_string(),
            method: HttpMethod::Get,
            description: String::new(),
            project_id: project.id,
        })
        .await
        .unwrap();

        assert_eq!(
            repo.url_configs_matching(project.id, "/users", "GET").await.unwrap().len(),
            1
        );
        assert!(repo
            .url_configs_matching(project.id, "/users/", "GET")
            .await
            .unwrap()
            .is_empty());
        assert!(repo
            .url_configs_matching(project.id, "/users", "get")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_owned_by_walks_the_hierarchy() {
        let repo = repository();
        let owner = account(&repo, "owner@example.com").await;
        let other = account(&repo, "other@example.com").await;
        let mine = project(&repo, owner.id).await;
        let theirs = project(&repo, other.id).await;

        for project_id in [mine.id, theirs.id] {
            let config = repo
                .create_url_config(&UrlConfigFields {
                    path: "/orders".to_string(),
                    method: HttpMethod::Post,
                    description: String::new(),
                    project_id,
                })
                .await
                .unwrap();
            let status = repo
                .create_status(&UrlHttpStatusFields {
                    url_id: config.id,
                    http_status: 201,
                    percentage: 100,
                })
                .await
                .unwrap();
            repo.create_response_model(&ResponseModelFields {
                url_http_status_id: status.id,
                model: json!({"project": project_id}).into(),
                description: String::new(),
            })
            .await
            .unwrap();
        }

        let models = repo.response_models_owned_by(owner.id).await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model, json!({"project": mine.id}));
        assert_eq!(repo.statuses_owned_by(other.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let repo = repository();
        let err = repo.account(42).await.unwrap_err();
        assert!(matches!(err, FakerError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = repository();
        account(&repo, "dup@example.com").await;

        let err = repo
            .create_account(&NewAccount {
                email: "dup@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FakerError::Conflict { .. }));
    }
}
