use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coachvoice::AssistantError;
use core_access::CoreAccessError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates the different kinds of errors that can occur
/// within the server, allowing them to be converted into appropriate HTTP
/// responses.
pub enum AppError {
    /// Missing or invalid credential; no partial work has been performed.
    Unauthorized(String),
    /// Bad input, rejected before any write.
    Validation(String),
    /// Entity absent or not owned by the caller; the two are identical.
    NotFound(String),
    /// Errors originating from the `coachvoice` library.
    Assistant(AssistantError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        AppError::Assistant(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<CoreAccessError> for AppError {
    fn from(err: CoreAccessError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Assistant(err) => {
                error!("AssistantError: {:?}", err);
                match err {
                    AssistantError::AiTimeout => {
                        (StatusCode::GATEWAY_TIMEOUT, "AI provider timed out.".to_string())
                    }
                    AssistantError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    AssistantError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    AssistantError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    AssistantError::AnalysisParse(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("AI provider returned an unusable response: {e}"),
                    ),
                    AssistantError::AccountRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to account provider failed: {e}"),
                    ),
                    AssistantError::AccountApi(_) => (
                        StatusCode::UNAUTHORIZED,
                        "Invalid account token.".to_string(),
                    ),
                    AssistantError::QuestionIndexOutOfRange(_) => {
                        (StatusCode::BAD_REQUEST, err.to_string())
                    }
                    AssistantError::StorageConnection(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Storage provider connection error: {e}"),
                    ),
                    AssistantError::StorageOperationFailed(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Storage operation failed: {e}"),
                    ),
                    AssistantError::JsonSerialization(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to serialize result: {e}"),
                    ),
                    AssistantError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
