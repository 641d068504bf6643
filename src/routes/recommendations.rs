use axum::{extract::State, Extension, Json};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

use crate::{
    auth::AuthenticatedStudent,
    error::AppResult,
    middleware::request_id::RequestId,
    models::ActivityRecommendations,
    routes::AppState,
    services::recommendations,
};

/// Handler for the activity recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    student: AuthenticatedStudent,
) -> AppResult<Json<ActivityRecommendations>> {
    tracing::info!(
        request_id = %request_id,
        student_id = %student.student_id,
        "Processing activity recommendation request"
    );

    let mut rng = StdRng::from_entropy();
    let response = recommendations::recommend_activities(
        &state.catalog,
        state.model.as_ref(),
        &student.student_id,
        &mut rng,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        count = response.recommendations.len(),
        "Activity recommendations completed"
    );

    Ok(Json(response))
}
