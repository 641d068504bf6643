use rand::{seq::SliceRandom, Rng};
use std::time::Instant;

use crate::{
    db::Catalog,
    error::{AppError, AppResult},
    inference::RatingModel,
    models::{ActivityRecommendations, StudentId, WebinarRecommendations},
    services::{
        encoder::CategoryEncoder,
        enrichment::{self, EXAMPLES_PER_CATEGORY},
        filter::filter_candidates,
        scorer::score_candidates,
        selector::{self, WebinarAccumulator, ACTIVITY_RESULT_LIMIT, WEBINAR_PICK_LIMIT},
    },
};

/// Personalized activity-category recommendations
///
/// Pipeline:
/// 1. Load offered categories and the student's taken coursework categories
/// 2. Fit the encoder on their union
/// 3. Drop taken categories
/// 4. Score each survivor with the model
/// 5. Shuffle and keep the first six (ratings annotate, they do not rank)
/// 6. Attach example activities per category
///
/// Any store or model failure aborts the request with no partial output.
pub async fn recommend_activities<R: Rng + Send>(
    catalog: &Catalog,
    model: &dyn RatingModel,
    student: &StudentId,
    rng: &mut R,
) -> AppResult<ActivityRecommendations> {
    let start = Instant::now();

    let all_categories = catalog.activity_categories().await?;
    if all_categories.is_empty() {
        return Err(AppError::NoCandidates("No activities found".to_string()));
    }

    let taken = catalog.taken_categories(student).await?;

    let encoder = CategoryEncoder::fit(all_categories.iter().chain(taken.iter()));

    let candidates = filter_candidates(&all_categories, &taken);

    tracing::info!(
        student_id = %student,
        universe = encoder.len(),
        taken = taken.len(),
        candidates = candidates.len(),
        "Filtered candidate categories"
    );

    if candidates.is_empty() {
        return Err(AppError::NoCandidates(
            "No untaken activity categories left to recommend".to_string(),
        ));
    }

    let scores = score_candidates(model, &encoder, student, &candidates)?;
    let selected = selector::random_top_n(scores, ACTIVITY_RESULT_LIMIT, rng);
    let recommendations = enrichment::enrich(catalog, selected, EXAMPLES_PER_CATEGORY).await?;

    tracing::info!(
        student_id = %student,
        recommendations = recommendations.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Activity recommendations ready"
    );

    Ok(ActivityRecommendations {
        student_id: student.clone(),
        recommendations,
    })
}

/// Diversified webinar picks
///
/// Shuffles the category universe, draws one random activity per category,
/// keeps draws whose name is new, stops at three, then shuffles the picks a
/// second time before returning.
pub async fn recommend_webinars<R: Rng + Send>(
    catalog: &Catalog,
    student: &StudentId,
    rng: &mut R,
) -> AppResult<WebinarRecommendations> {
    let mut categories = catalog.webinar_categories(student).await?;
    if categories.is_empty() {
        return Err(AppError::NoCandidates(
            "No categories found for this student.".to_string(),
        ));
    }

    categories.shuffle(rng);

    let mut accumulator = WebinarAccumulator::new(WEBINAR_PICK_LIMIT);
    let mut draws = 0;

    for category in &categories {
        draws += 1;
        if let Some(pick) = catalog.random_activity_in(category).await? {
            if !accumulator.offer(pick) {
                tracing::debug!(category = %category, "Duplicate webinar draw rejected");
            }
        }

        if accumulator.is_full() {
            break;
        }
    }

    tracing::info!(
        student_id = %student,
        categories = categories.len(),
        draws,
        picks = accumulator.len(),
        "Webinar selection finished"
    );

    if accumulator.is_empty() {
        return Err(AppError::NotFound(
            "No webinars found for the recommended categories.".to_string(),
        ));
    }

    Ok(WebinarRecommendations {
        success: true,
        student_id: student.clone(),
        recommended_webinars: accumulator.finish(rng),
    })
}
