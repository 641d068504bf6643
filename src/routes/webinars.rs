use axum::{extract::State, Extension, Json};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

use crate::{
    auth::AuthenticatedStudent,
    error::AppResult,
    middleware::request_id::RequestId,
    models::WebinarRecommendations,
    routes::AppState,
    services::recommendations,
};

/// Handler for the webinar recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    student: AuthenticatedStudent,
) -> AppResult<Json<WebinarRecommendations>> {
    tracing::info!(
        request_id = %request_id,
        student_id = %student.student_id,
        "Processing webinar recommendation request"
    );

    let mut rng = StdRng::from_entropy();
    let response =
        recommendations::recommend_webinars(&state.catalog, &student.student_id, &mut rng).await?;

    tracing::info!(
        request_id = %request_id,
        count = response.recommended_webinars.len(),
        "Webinar recommendations completed"
    );

    Ok(Json(response))
}
