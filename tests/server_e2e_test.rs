mod common;

use anyhow::{Context, Result};
use api_faker::adapters::memory_store::MemoryConfigStore;
use api_faker::router;
use common::{test_state, TEST_PASSWORD};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

struct RunningServer {
    base: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    async fn start() -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let app = router(test_state(Arc::new(MemoryConfigStore::new())));
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
        });

        Ok(Self {
            base: format!("http://{}", addr),
            shutdown: Some(tx),
            handle,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await?.context("server exited with an error")
    }
}

async fn data_of(response: reqwest::Response) -> Result<Value> {
    let body: Value = response.json().await?;
    Ok(body["data"].clone())
}

#[tokio::test]
async fn test_configure_then_mock_over_tcp() -> Result<()> {
    let server = RunningServer::start().await?;
    let client = reqwest::Client::new();

    let signup = client
        .post(server.url("/account"))
        .json(&json!({"email": "e2e@example.com", "password": TEST_PASSWORD}))
        .send()
        .await?;
    assert_eq!(signup.status().as_u16(), 201);

    let login = client
        .post(server.url("/login"))
        .json(&json!({"email": "e2e@example.com", "password": TEST_PASSWORD}))
        .send()
        .await?;
    assert_eq!(login.status().as_u16(), 200);
    let token = data_of(login).await?["token"]
        .as_str()
        .context("login returned no token")?
        .to_string();

    let project = data_of(
        client
            .post(server.url("/api/project"))
            .bearer_auth(&token)
            .json(&json!({"name": "Storefront"}))
            .send()
            .await?,
    )
    .await?;
    let project_id = project["id"].as_i64().context("project id")?;

    let config = data_of(
        client
            .post(server.url("/api/url_config"))
            .bearer_auth(&token)
            .json(&json!({"path": "/cart/items", "method": "PATCH", "project_id": project_id}))
            .send()
            .await?,
    )
    .await?;
    let url_id = config["id"].as_i64().context("url config id")?;

    let status = data_of(
        client
            .post(server.url("/api/url_http_status"))
            .bearer_auth(&token)
            .json(&json!({"url_id": url_id, "http_status": 202, "percentage": 100}))
            .send()
            .await?,
    )
    .await?;
    let status_id = status["id"].as_i64().context("status id")?;

    let model = client
        .post(server.url("/api/response_model"))
        .bearer_auth(&token)
        .json(&json!({"url_http_status_id": status_id, "model": {"accepted": true, "items": 3}}))
        .send()
        .await?;
    assert_eq!(model.status().as_u16(), 201);

    let mocked = client
        .patch(server.url("/api/mock/cart/items"))
        .bearer_auth(&token)
        .header("X-Project-Id", project_id.to_string())
        .send()
        .await?;
    assert_eq!(mocked.status().as_u16(), 202);
    let body: Value = mocked.json().await?;
    assert_eq!(body, json!({"accepted": true, "items": 3}));

    let unknown = client
        .get(server.url("/api/mock/cart/items"))
        .bearer_auth(&token)
        .header("X-Project-Id", project_id.to_string())
        .send()
        .await?;
    assert_eq!(unknown.status().as_u16(), 404);
    let envelope: Value = unknown.json().await?;
    assert_eq!(envelope["stack"], "GET /cart/items");

    server.stop().await
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() -> Result<()> {
    let server = RunningServer::start().await?;

    let response = reqwest::Client::new()
        .post(server.url("/account"))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 400);
    let envelope: Value = response.json().await?;
    assert_eq!(envelope["message"], "Validation failed");
    assert!(envelope["data"].is_null());

    server.stop().await
}
