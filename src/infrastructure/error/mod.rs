use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::CatalogError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(msg) => AppError::NotFound(msg),
            CatalogError::InvalidReference(msg) => AppError::InvalidReference(msg),
            CatalogError::Conflict(msg) => AppError::Conflict(msg),
            CatalogError::Validation(msg) => AppError::Validation(msg),
            CatalogError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::InvalidReference(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidReference(_) => "INVALID_REFERENCE",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the client; server-side failures are redacted in production.
    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidReference(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Config(_) if is_production() => "Configuration error".to_string(),
            AppError::Storage(_) if is_production() => "Service temporarily unavailable".to_string(),
            AppError::Internal(_) if is_production() => "Internal server error".to_string(),
            AppError::Config(e) => e.to_string(),
            AppError::Storage(msg) | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(code = %code, status = %status.as_u16(), message = %self, "API error");
        } else {
            tracing::warn!(code = %code, status = %status.as_u16(), message = %self, "API error");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.client_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    #[test]
    fn test_catalog_error_status_mapping() {
        let cases = [
            (CatalogError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::InvalidReference("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::Conflict("x".into()), StatusCode::CONFLICT),
            (CatalogError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                CatalogError::Storage(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        use http_body_util::BodyExt;

        let response = AppError::Conflict("name taken".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert_eq!(json["error"]["message"], "name taken");
    }
}
