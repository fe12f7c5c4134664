use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const TODO_NOT_FOUND: &str = "Todo Not Found";

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TodoError {
    pub fn todo_not_found() -> Self {
        TodoError::NotFound(TODO_NOT_FOUND.to_string())
    }
}

impl From<JsonRejection> for TodoError {
    fn from(rejection: JsonRejection) -> Self {
        TodoError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for TodoError {
    fn from(rejection: PathRejection) -> Self {
        TodoError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            TodoError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            TodoError::InvalidRequest(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            other => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %other, "Request failed");
                #[cfg(not(feature = "tracing"))]
                let _ = other;
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
