use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::inference::ModelError;

/// Bearer credential failures, raised before any store or model access
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token is required")]
    Missing,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

/// Store failures, classified by whether a retry can clear them
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("store failure: {0}")]
    Permanent(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error during {operation} after {attempts} attempt(s): {source}")]
    DataAccess {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("Model inference error: {0}")]
    ModelInference(#[from] ModelError),

    #[error("Category not in fitted universe: {0}")]
    UnknownCategory(String),

    #[error("No candidates: {0}")]
    NoCandidates(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::Missing) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NoCandidates(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DataAccess { .. }
            | AppError::ModelInference(_)
            | AppError::UnknownCategory(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Infrastructure detail stays in the logs
        let message = match &self {
            AppError::DataAccess { .. } => {
                tracing::error!(error = %self, "Request aborted by data access failure");
                "Database error".to_string()
            }
            AppError::ModelInference(_) => {
                tracing::error!(error = %self, "Request aborted by model failure");
                "Model inference error".to_string()
            }
            AppError::UnknownCategory(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Internal invariant violated");
                "Unexpected error occurred".to_string()
            }
            AppError::Auth(e) => e.to_string(),
            AppError::NoCandidates(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidCredentials => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
