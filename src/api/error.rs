use crate::api::envelope::Envelope;
use crate::utils::error::FakerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

const INTERNAL_ERROR: &str = "Internal server error";

impl FakerError {
    /// Client-facing `(message, stack)`. Server-side failures share one
    /// generic message so internals never leak.
    fn public_parts(&self) -> (String, String) {
        match self {
            Self::ValidationError { field, reason } => {
                ("Validation failed".to_string(), format!("{}: {}", field, reason))
            }
            Self::Unauthorized { reason } => ("Unauthorized".to_string(), reason.clone()),
            Self::NotFound { entity, id } => (format!("{} not found", entity), format!("id {}", id)),
            Self::NotConfigured { method, path } => (
                "URL not configured for mocking".to_string(),
                format!("{} {}", method, path),
            ),
            Self::Conflict { message } => ("Resource already exists".to_string(), message.clone()),
            _ => (INTERNAL_ERROR.to_string(), String::new()),
        }
    }
}

impl IntoResponse for FakerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(category = ?self.category(), "❌ Request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let (message, stack) = self.public_parts();
        (status, Json(Envelope::without_data(message, stack))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::StoreError;

    #[test]
    fn test_server_errors_hide_details() {
        let err = FakerError::BackendUnavailable(StoreError::Unavailable {
            message: "disk /var/lib/faker.db is full".to_string(),
        });
        let (message, stack) = err.public_parts();

        assert_eq!(message, INTERNAL_ERROR);
        assert!(stack.is_empty());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_errors_keep_their_reason() {
        let err = FakerError::validation("percentage", "total percentage exceeds 100");
        let (message, stack) = err.public_parts();

        assert_eq!(message, "Validation failed");
        assert_eq!(stack, "percentage: total percentage exceeds 100");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FakerError::unauthorized("missing token").into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            FakerError::Conflict {
                message: "duplicate".into()
            }
            .into_response()
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            FakerError::NotConfigured {
                method: "GET".into(),
                path: "/x".into()
            }
            .into_response()
            .status(),
            StatusCode::NOT_FOUND
        );
    }
}
