//! HTTP surface: public signup/login, the authenticated configuration CRUD
//! under `/api`, and the mock endpoint.

pub mod envelope;
pub mod error;
pub mod extract;
pub mod handlers;

use crate::adapters::jwt::JwtAuthenticator;
use crate::core::{ConfigRepository, MockResolver, OwnershipAuthorizer};
use crate::domain::ports::{RollSource, SharedStore};
use axum::routing::{any, get, post};
use axum::Router;
use handlers::{account, health, mock, project, response_model, url_config, url_http_status};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: ConfigRepository,
    pub authorizer: OwnershipAuthorizer,
    pub resolver: MockResolver,
    pub authenticator: Arc<JwtAuthenticator>,
}

impl AppState {
    pub fn new(store: SharedStore, authenticator: JwtAuthenticator, rolls: Arc<dyn RollSource>) -> Self {
        let repository = ConfigRepository::new(store.clone());
        Self {
            authorizer: OwnershipAuthorizer::new(repository.clone()),
            resolver: MockResolver::new(store, rolls),
            repository,
            authenticator: Arc::new(authenticator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/account", get(account::current))
        .route(
            "/account/{id}",
            get(account::get).put(account::update).delete(account::delete),
        )
        .route("/project", get(project::list).post(project::create))
        .route(
            "/project/{id}",
            get(project::get).put(project::update).delete(project::delete),
        )
        .route("/url_config", get(url_config::list).post(url_config::create))
        .route(
            "/url_config/{id}",
            get(url_config::get)
                .put(url_config::update)
                .delete(url_config::delete),
        )
        .route(
            "/url_http_status",
            get(url_http_status::list).post(url_http_status::create),
        )
        .route(
            "/url_http_status/{id}",
            get(url_http_status::get)
                .put(url_http_status::update)
                .delete(url_http_status::delete),
        )
        .route(
            "/response_model",
            get(response_model::list).post(response_model::create),
        )
        .route(
            "/response_model/{id}",
            get(response_model::get)
                .put(response_model::update)
                .delete(response_model::delete),
        )
        // the wildcard never matches an empty remainder
        .route("/mock", any(mock::serve_root))
        .route("/mock/", any(mock::serve_root))
        .route("/mock/{*path}", any(mock::serve));

    Router::new()
        .route("/health", get(health::health))
        .route("/account", post(account::signup))
        .route("/login", post(account::login))
        .nest("/api", api)
        .with_state(state)
}
