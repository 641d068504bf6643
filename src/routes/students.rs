use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    auth::AuthenticatedStudent,
    error::{AppError, AppResult},
    models::{StudentActivity, StudentDetail, StudentProfile},
    routes::AppState,
};

/// Activities listed per student
const STUDENT_ACTIVITY_LIMIT: usize = 6;

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetailResponse {
    pub student: StudentDetail,
    /// `null` when the student has no enrollments
    pub total_credits: Option<f64>,
}

/// The student's own activity history
pub async fn activities(
    State(state): State<Arc<AppState>>,
    student: AuthenticatedStudent,
) -> AppResult<Json<DataResponse<Vec<StudentActivity>>>> {
    let activities = state
        .catalog
        .student_activities(&student.student_id, STUDENT_ACTIVITY_LIMIT)
        .await?;

    Ok(Json(DataResponse {
        success: true,
        data: activities,
    }))
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    student: AuthenticatedStudent,
) -> AppResult<Json<DataResponse<StudentProfile>>> {
    let profile = state
        .catalog
        .student_profile(&student.student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student is not in student list".to_string()))?;

    Ok(Json(DataResponse {
        success: true,
        data: profile,
    }))
}

/// Profile plus cohort, GPA and total enrolled credits
pub async fn detail(
    State(state): State<Arc<AppState>>,
    student: AuthenticatedStudent,
) -> AppResult<Json<DataResponse<StudentDetailResponse>>> {
    let detail = state
        .catalog
        .student_detail(&student.student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found.".to_string()))?;

    let total_credits = state.catalog.credit_total(&student.student_id).await?;

    Ok(Json(DataResponse {
        success: true,
        data: StudentDetailResponse {
            student: detail,
            total_credits,
        },
    }))
}
