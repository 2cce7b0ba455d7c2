use crate::api::AppState;
use crate::domain::ports::Authenticator;
use crate::utils::error::{FakerError, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;

pub const PROJECT_HEADER: &str = "x-project-id";

/// Account id taken from a verified `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount(pub i64);

impl FromRequestParts<AppState> for AuthenticatedAccount {
    type Rejection = FakerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| FakerError::unauthorized("missing Authorization header"))?;
        let value = header
            .to_str()
            .map_err(|_| FakerError::unauthorized("malformed Authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| FakerError::unauthorized("expected a Bearer token"))?;

        let account_id = state.authenticator.verify(token)?;
        Ok(Self(account_id))
    }
}

/// Project a mocked request is scoped to. Absent → 401, non-numeric → 400.
pub fn project_scope(headers: &HeaderMap) -> Result<i64> {
    let raw = headers
        .get(PROJECT_HEADER)
        .ok_or_else(|| FakerError::unauthorized("missing X-Project-Id header"))?;
    raw.to_str()
        .ok()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or_else(|| FakerError::validation("X-Project-Id", "must be a numeric project id"))
}

/// Path ids arrive as strings so a non-numeric id is a 400 in our envelope.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| FakerError::validation("id", "id must be a positive integer"))
}

pub fn parse_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| FakerError::validation("body", format!("Invalid request payload: {}", rejection.body_text())))
}

pub fn parse_query<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| FakerError::validation("query", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_project_scope_header() {
        let mut headers = HeaderMap::new();
        let missing = project_scope(&headers).unwrap_err();
        assert_eq!(missing.http_status(), 401);

        headers.insert(PROJECT_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(project_scope(&headers).unwrap_err().http_status(), 400);

        headers.insert(PROJECT_HEADER, HeaderValue::from_static(" 42 "));
        assert_eq!(project_scope(&headers).unwrap(), 42);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("17").unwrap(), 17);
        assert!(parse_id("seventeen").is_err());
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
    }
}
