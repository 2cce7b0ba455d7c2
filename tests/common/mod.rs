#![allow(dead_code)]

use anyhow::{Context, Result};
use api_faker::adapters::jwt::JwtAuthenticator;
use api_faker::adapters::memory_store::MemoryConfigStore;
use api_faker::core::SeededRolls;
use api_faker::domain::ports::SharedStore;
use api_faker::{router, AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789";
pub const TEST_PASSWORD: &str = "Sup3r$ecret";

pub fn test_state(store: SharedStore) -> AppState {
    AppState::new(
        store,
        JwtAuthenticator::new(TEST_JWT_SECRET, 3_600),
        Arc::new(SeededRolls::new(2024)),
    )
}

pub fn test_router() -> axum::Router {
    router(test_state(Arc::new(MemoryConfigStore::new())))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Body exactly as sent, for byte-level comparisons.
    pub raw: String,
    pub content_type: Option<String>,
}

pub struct Call<'a> {
    method: Method,
    uri: String,
    token: Option<&'a str>,
    headers: Vec<(&'static str, String)>,
    body: Option<String>,
}

impl<'a> Call<'a> {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            token: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    pub fn header(mut self, name: &'static str, value: impl ToString) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Sends `text` verbatim as a JSON request body.
    pub fn raw_json(mut self, text: impl Into<String>) -> Self {
        self.body = Some(text.into());
        self
    }

    pub async fn send(self, router: &axum::Router) -> Result<TestResponse> {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if let Some(token) = self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        let request = match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))?,
            None => builder.body(Body::empty())?,
        };

        let response = router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|err| match err {});
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .context("read response body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        let raw = String::from_utf8(bytes.to_vec()).context("response body is not UTF-8")?;

        Ok(TestResponse {
            status,
            body,
            raw,
            content_type,
        })
    }
}

/// Signs up and logs in, returning `(account_id, token)`.
pub async fn register(router: &axum::Router, email: &str) -> Result<(i64, String)> {
    let created = Call::new(Method::POST, "/account")
        .json(json!({"email": email, "password": TEST_PASSWORD}))
        .send(router)
        .await?;
    anyhow::ensure!(created.status == StatusCode::CREATED, "signup failed: {}", created.body);
    let account_id = created.body["data"]["id"].as_i64().context("account id")?;

    let login = Call::new(Method::POST, "/login")
        .json(json!({"email": email, "password": TEST_PASSWORD}))
        .send(router)
        .await?;
    anyhow::ensure!(login.status == StatusCode::OK, "login failed: {}", login.body);
    let token = login.body["data"]["token"].as_str().context("token")?.to_string();

    Ok((account_id, token))
}

/// POSTs `body` to `uri` and returns the created row's id.
pub async fn create(router: &axum::Router, token: &str, uri: &str, body: Value) -> Result<i64> {
    let response = Call::new(Method::POST, uri).token(token).json(body).send(router).await?;
    anyhow::ensure!(
        response.status == StatusCode::CREATED,
        "POST {} returned {}: {}",
        uri,
        response.status,
        response.body
    );
    response.body["data"]["id"].as_i64().context("created id")
}

pub struct MockRoute {
    pub project_id: i64,
    pub url_config_id: i64,
    pub status_ids: Vec<i64>,
}

/// Creates a project with one route and `(status, percentage, body)` entries.
pub async fn mock_route(
    router: &axum::Router,
    token: &str,
    method: &str,
    path: &str,
    statuses: &[(u16, u32, Value)],
) -> Result<MockRoute> {
    let project_id = create(router, token, "/api/project", json!({"name": "Mocked API"})).await?;
    let url_config_id = create(
        router,
        token,
        "/api/url_config",
        json!({"path": path, "method": method, "project_id": project_id}),
    )
    .await?;

    let mut status_ids = Vec::new();
    for (code, percentage, body) in statuses {
        let status_id = create(
            router,
            token,
            "/api/url_http_status",
            json!({"url_id": url_config_id, "http_status": code, "percentage": percentage}),
        )
        .await?;
        create(
            router,
            token,
            "/api/response_model",
            json!({"url_http_status_id": status_id, "model": body}),
        )
        .await?;
        status_ids.push(status_id);
    }

    Ok(MockRoute {
        project_id,
        url_config_id,
        status_ids,
    })
}
