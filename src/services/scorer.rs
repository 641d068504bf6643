use crate::{
    error::AppResult,
    inference::RatingModel,
    models::{CandidateScore, Category, StudentId},
    services::encoder::CategoryEncoder,
};

/// Scores every candidate category for the student
///
/// Any model failure aborts the whole batch; there is no partial result.
/// Output order mirrors the input and carries no ranking meaning.
pub fn score_candidates(
    model: &dyn RatingModel,
    encoder: &CategoryEncoder,
    student: &StudentId,
    candidates: &[Category],
) -> AppResult<Vec<CandidateScore>> {
    let scores = candidates
        .iter()
        .map(|category| {
            let index = encoder.encode(category)?;
            let prediction = model.predict(student.as_str(), index)?;
            Ok(CandidateScore {
                category: category.clone(),
                estimated_rating: prediction.estimated_rating,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    tracing::debug!(
        student_id = %student,
        model = model.name(),
        scored = scores.len(),
        "Scored candidate categories"
    );

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::inference::{MockRatingModel, ModelError, Prediction};
    use mockall::predicate::eq;

    fn candidates(labels: &[&str]) -> Vec<Category> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_scores_each_candidate_with_encoded_index() {
        let encoder = CategoryEncoder::fit(["Arts", "Seminar", "Sports"]);
        let mut model = MockRatingModel::new();
        model.expect_name().return_const("mock");
        model
            .expect_predict()
            .with(eq("s1"), eq(1))
            .times(1)
            .returning(|_, _| Ok(Prediction { estimated_rating: 4.5 }));
        model
            .expect_predict()
            .with(eq("s1"), eq(0))
            .times(1)
            .returning(|_, _| Ok(Prediction { estimated_rating: 3.0 }));

        let scores = score_candidates(
            &model,
            &encoder,
            &StudentId::new("s1"),
            &candidates(&["Seminar", "Arts"]),
        )
        .unwrap();

        assert_eq!(
            scores,
            vec![
                CandidateScore {
                    category: "Seminar".into(),
                    estimated_rating: 4.5
                },
                CandidateScore {
                    category: "Arts".into(),
                    estimated_rating: 3.0
                },
            ]
        );
    }

    #[test]
    fn test_model_failure_aborts_batch() {
        let encoder = CategoryEncoder::fit(["Arts", "Seminar"]);
        let mut model = MockRatingModel::new();
        model.expect_name().return_const("mock");
        model
            .expect_predict()
            .returning(|_, _| Err(ModelError::NonFinite {
                student_id: "s1".into(),
                item: 0,
            }));

        let result = score_candidates(
            &model,
            &encoder,
            &StudentId::new("s1"),
            &candidates(&["Arts", "Seminar"]),
        );

        assert!(matches!(result, Err(AppError::ModelInference(_))));
    }

    #[test]
    fn test_unencodable_candidate_is_invariant_violation() {
        let encoder = CategoryEncoder::fit(["Arts"]);
        let mut model = MockRatingModel::new();
        model.expect_predict().never();

        let result = score_candidates(
            &model,
            &encoder,
            &StudentId::new("s1"),
            &candidates(&["Sports"]),
        );

        assert!(matches!(result, Err(AppError::UnknownCategory(_))));
    }
}
