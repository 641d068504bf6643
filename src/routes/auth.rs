use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    auth::password::verify_password_blocking,
    error::{AppError, AppResult},
    models::StudentId,
    routes::{json::JsonBody, AppState},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub student_id: StudentId,
    pub student_name: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Verifies student credentials and issues a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if request.student_id.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "studentId and password are required".to_string(),
        ));
    }

    let student_id = StudentId::new(request.student_id.trim());
    let credentials = state
        .catalog
        .student_credentials(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    if !verify_password_blocking(request.password, credentials.password_hash).await? {
        tracing::warn!(student_id = %student_id, "Login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue(credentials.student_id.as_str(), &credentials.name)?;

    tracing::info!(student_id = %student_id, "Login successful");

    Ok(Json(LoginResponse {
        status: "success",
        message: "Login successful",
        student_id: credentials.student_id,
        student_name: credentials.name,
        token,
    }))
}

/// Tokens are not tracked server-side; clients discard theirs
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        status: "success",
        message: "Logout successful",
    })
}
