use crate::api::extract::{project_scope, AuthenticatedAccount};
use crate::api::AppState;
use crate::core::MockRequest;
use crate::utils::error::{FakerError, Result};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};

/// `ANY /api/mock/{*path}`: answers with the selected status and the stored
/// body, byte for byte.
pub async fn serve(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    method: Method,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    respond(&state, account_id, &method, path.trim_start_matches('/'), &headers).await
}

/// `ANY /api/mock` and `/api/mock/`: the mocked root path `/`.
pub async fn serve_root(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    method: Method,
    headers: HeaderMap,
) -> Result<Response> {
    respond(&state, account_id, &method, "", &headers).await
}

async fn respond(
    state: &AppState,
    account_id: i64,
    method: &Method,
    remainder: &str,
    headers: &HeaderMap,
) -> Result<Response> {
    let project_id = project_scope(headers)?;
    let request = MockRequest::new(method.as_str(), format!("/{}", remainder), project_id);

    let resolved = state.resolver.resolve(&request, account_id).await?;
    let status = StatusCode::from_u16(resolved.status_code).map_err(|_| {
        FakerError::ConfigurationIntegrityError {
            message: format!(
                "status {} stores an unusable code {}",
                resolved.status_id, resolved.status_code
            ),
        }
    })?;

    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        resolved.body.into_string(),
    )
        .into_response())
}
