//! The `{message, stack, data, pagination?}` body shared by every non-mock
//! response.

use crate::utils::error::{FakerError, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub message: String,
    #[serde(default)]
    pub stack: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl Envelope {
    pub fn without_data(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: stack.into(),
            data: None,
            pagination: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageQuery {
    fn requested(&self) -> bool {
        self.page.is_some() || self.page_size.is_some()
    }
}

/// Slices `items` when the caller asked for a page; otherwise returns
/// everything without pagination metadata.
pub fn paginate<T>(items: Vec<T>, query: &PageQuery) -> Result<(Vec<T>, Option<Pagination>)> {
    if !query.requested() {
        return Ok((items, None));
    }

    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 {
        return Err(FakerError::validation("page", "page starts at 1"));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(FakerError::validation(
            "page_size",
            format!("page_size must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }

    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(page_size);
    let skip = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size).unwrap_or(usize::MAX);
    let page_items = items.into_iter().skip(skip).take(take).collect();

    Ok((
        page_items,
        Some(Pagination {
            current_page: page,
            page_size,
            total_items,
            total_pages,
        }),
    ))
}

/// A successful handler result.
#[derive(Debug)]
pub struct Reply {
    status: StatusCode,
    body: Envelope,
}

impl Reply {
    fn with_data<T: Serialize>(status: StatusCode, message: &str, data: &T) -> Result<Self> {
        Ok(Self {
            status,
            body: Envelope {
                message: message.to_string(),
                stack: String::new(),
                data: Some(serde_json::to_value(data)?),
                pagination: None,
            },
        })
    }

    pub fn ok<T: Serialize>(message: &str, data: &T) -> Result<Self> {
        Self::with_data(StatusCode::OK, message, data)
    }

    pub fn created<T: Serialize>(message: &str, data: &T) -> Result<Self> {
        Self::with_data(StatusCode::CREATED, message, data)
    }

    pub fn page<T: Serialize>(message: &str, items: Vec<T>, query: &PageQuery) -> Result<Self> {
        let (items, pagination) = paginate(items, query)?;
        let mut reply = Self::with_data(StatusCode::OK, message, &items)?;
        reply.body.pagination = pagination;
        Ok(reply)
    }

    /// No payload, e.g. after a delete.
    pub fn message(message: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::without_data(message, ""),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
