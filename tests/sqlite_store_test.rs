mod common;

use anyhow::Result;
use api_faker::adapters::sqlite_store::{SqliteConfigStore, SqliteStoreConfig};
use api_faker::core::{ConfigRepository, MockRequest, MockResolver};
use api_faker::domain::model::{
    HttpMethod, MockBody, NewAccount, NewProject, ResponseModelFields, UrlConfigFields,
    UrlHttpStatusFields,
};
use api_faker::domain::ports::{EntityKind, RollSource, SharedStore};
use api_faker::{router, FakerError};
use axum::http::{Method, StatusCode};
use common::{mock_route, register, test_state, Call};
use serde_json::json;
use std::sync::Arc;

const ORDERS_BODY: &str =
    r#"{"orders": [{"id": 1, "total": 9.50}], "note": "ünïcødé", "cursor": 90071992547409931234}"#;

struct FixedRoll(u32);

impl RollSource for FixedRoll {
    fn roll(&self) -> u32 {
        self.0
    }
}

struct Seeded {
    account_id: i64,
    project_id: i64,
    url_config_id: i64,
    status_id: i64,
}

async fn seed(repo: &ConfigRepository) -> Result<Seeded> {
    let account = repo
        .create_account(&NewAccount {
            email: "sqlite@example.com".to_string(),
            password: "not-a-real-hash".to_string(),
        })
        .await?;
    let project = repo
        .create_project(&NewProject {
            name: "Persistent".to_string(),
            description: String::new(),
            owner_id: account.id,
        })
        .await?;
    let config = repo
        .create_url_config(&UrlConfigFields {
            path: "/orders".to_string(),
            method: HttpMethod::Get,
            description: String::new(),
            project_id: project.id,
        })
        .await?;
    let status = repo
        .create_status(&UrlHttpStatusFields {
            url_id: config.id,
            http_status: 200,
            percentage: 100,
        })
        .await?;
    repo.create_response_model(&ResponseModelFields {
        url_http_status_id: status.id,
        model: MockBody::parse(ORDERS_BODY)?,
        description: "sample".to_string(),
    })
    .await?;

    Ok(Seeded {
        account_id: account.id,
        project_id: project.id,
        url_config_id: config.id,
        status_id: status.id,
    })
}

#[tokio::test]
async fn test_configuration_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = SqliteStoreConfig::new(dir.path().join("nested").join("faker.db"));

    let seeded = {
        let store = SqliteConfigStore::open(&config)?;
        let seeded = seed(&ConfigRepository::new(Arc::new(store.clone()))).await?;
        store.close()?;
        seeded
    };

    let store: SharedStore = Arc::new(SqliteConfigStore::open(&config)?);
    let resolver = MockResolver::new(store.clone(), Arc::new(FixedRoll(42)));
    let resolved = resolver
        .resolve(&MockRequest::new("get", "/orders", seeded.project_id), seeded.account_id)
        .await?;

    assert_eq!(resolved.status_code, 200);
    assert_eq!(resolved.status_id, seeded.status_id);
    assert_eq!(resolved.body.as_str(), ORDERS_BODY);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_route_is_a_conflict() -> Result<()> {
    let repo = ConfigRepository::new(Arc::new(SqliteConfigStore::open_in_memory()?));
    let seeded = seed(&repo).await?;

    let err = repo
        .create_url_config(&UrlConfigFields {
            path: "/orders".to_string(),
            method: HttpMethod::Get,
            description: "again".to_string(),
            project_id: seeded.project_id,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FakerError::Conflict { .. }), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn test_deleting_an_account_cascades() -> Result<()> {
    let repo = ConfigRepository::new(Arc::new(SqliteConfigStore::open_in_memory()?));
    let seeded = seed(&repo).await?;

    repo.delete(EntityKind::Account, seeded.account_id).await?;

    assert!(repo.find_project(seeded.project_id).await?.is_none());
    assert!(repo.find_url_config(seeded.url_config_id).await?.is_none());
    assert!(repo.find_status(seeded.status_id).await?.is_none());
    assert!(repo.response_models_for(seeded.status_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_http_surface_over_sqlite() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SqliteConfigStore::open(&SqliteStoreConfig::new(dir.path().join("api.db")))?;
    let router = router(test_state(Arc::new(store)));

    let (_, token) = register(&router, "owner@example.com").await?;
    let route = mock_route(
        &router,
        &token,
        "DELETE",
        "/sessions/current",
        &[(204, 100, json!({}))],
    )
    .await?;

    let response = Call::new(Method::DELETE, "/api/mock/sessions/current")
        .token(&token)
        .header("X-Project-Id", route.project_id)
        .send(&router)
        .await?;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let duplicate = Call::new(Method::POST, "/account")
        .json(json!({"email": "owner@example.com", "password": common::TEST_PASSWORD}))
        .send(&router)
        .await?;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    Ok(())
}
