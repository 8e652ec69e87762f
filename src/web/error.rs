use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as _;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Render error: {0}")]
    RenderError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => {
                warn!(error = %msg, "Rejected invalid request.");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::StorageUnavailable(msg) => {
                error!(error = %msg, "Storage operation failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage unavailable: {msg}"))
            }
            AppError::RenderError(msg) => {
                error!(error = %msg, "Failed to render page.");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Render error: {msg}"))
            }
        };
        (
            status,
            Json(serde_json::json!({ "status": "error", "message": error_message })),
        )
            .into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the useful part in the source chain
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        AppError::RenderError(message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidInput("Missing name".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(sea_orm::DbErr::Custom("disk gone".into())).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::RenderError("bad template".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_machine_readable() {
        let response = AppError::InvalidInput("Missing name or time".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Missing name or time");
    }
}
