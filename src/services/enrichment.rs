use crate::{
    db::Catalog,
    error::AppResult,
    models::{CandidateScore, Recommendation},
};

/// Example activities attached to each recommended category
pub const EXAMPLES_PER_CATEGORY: usize = 6;

/// Attaches up to `limit` example activity names to each selected category
///
/// Lookups run one category at a time; the first failed lookup fails the
/// whole batch. Names are not deduplicated across categories.
pub async fn enrich(
    catalog: &Catalog,
    selected: Vec<CandidateScore>,
    limit: usize,
) -> AppResult<Vec<Recommendation>> {
    let mut recommendations = Vec::with_capacity(selected.len());

    for candidate in selected {
        let relevant_activities = catalog
            .example_activities(&candidate.category, limit)
            .await?;

        recommendations.push(Recommendation {
            category: candidate.category,
            predicted_rating: candidate.estimated_rating,
            relevant_activities,
        });
    }

    Ok(recommendations)
}
