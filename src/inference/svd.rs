use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::{ModelError, Prediction, RatingModel};

/// Learned bias and latent factors for one student or one item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatentVector {
    pub bias: f64,
    pub factors: Vec<f64>,
}

/// Biased matrix-factorization model
///
/// `estimate = mean + b_u + b_i + q_i · p_u`, keeping only the terms that are
/// known for the pair, then clipped to the rating scale. Items are keyed by
/// the dense category index produced by the category encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvdModel {
    pub global_mean: f64,
    pub rating_scale: (f64, f64),
    #[serde(default)]
    pub students: HashMap<String, LatentVector>,
    #[serde(default)]
    pub items: HashMap<usize, LatentVector>,
}

impl SvdModel {
    /// Loads a model artifact serialized as JSON
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read model {}: {}", path.display(), e))?;
        let model: SvdModel = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse model {}: {}", path.display(), e))?;

        let (low, high) = model.rating_scale;
        if !low.is_finite() || !high.is_finite() || low >= high {
            anyhow::bail!("Invalid rating scale ({}, {})", low, high);
        }

        tracing::info!(
            path = %path.display(),
            students = model.students.len(),
            items = model.items.len(),
            "Loaded rating model"
        );

        Ok(model)
    }

    fn estimate(&self, student_id: &str, item: usize) -> Result<f64, ModelError> {
        let student = self.students.get(student_id);
        let item_vector = self.items.get(&item);

        let mut estimate = self.global_mean;

        if let Some(s) = student {
            estimate += s.bias;
        }
        if let Some(i) = item_vector {
            estimate += i.bias;
        }
        if let (Some(s), Some(i)) = (student, item_vector) {
            if s.factors.len() != i.factors.len() {
                return Err(ModelError::DimensionMismatch {
                    student: s.factors.len(),
                    item: i.factors.len(),
                });
            }
            estimate += s
                .factors
                .iter()
                .zip(&i.factors)
                .map(|(p, q)| p * q)
                .sum::<f64>();
        }

        Ok(estimate)
    }
}

impl RatingModel for SvdModel {
    fn predict(&self, student_id: &str, category_index: usize) -> Result<Prediction, ModelError> {
        let raw = self.estimate(student_id, category_index)?;

        if !raw.is_finite() {
            return Err(ModelError::NonFinite {
                student_id: student_id.to_string(),
                item: category_index,
            });
        }

        let (low, high) = self.rating_scale;
        Ok(Prediction {
            estimated_rating: raw.clamp(low, high),
        })
    }

    fn name(&self) -> &'static str {
        "svd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> SvdModel {
        serde_json::from_value(json!({
            "global_mean": 3.0,
            "rating_scale": [1.0, 5.0],
            "students": {
                "s1": { "bias": 0.5, "factors": [1.0, 0.0] }
            },
            "items": {
                "0": { "bias": 0.25, "factors": [0.5, 2.0] },
                "1": { "bias": -0.5, "factors": [4.0, 0.0] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_known_pair_uses_all_terms() {
        let prediction = model().predict("s1", 0).unwrap();
        // 3.0 + 0.5 + 0.25 + (1.0 * 0.5)
        assert!((prediction.estimated_rating - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_is_clipped_to_scale() {
        // 3.0 + 0.5 - 0.5 + 4.0 = 7.0
        assert_eq!(model().predict("s1", 1).unwrap().estimated_rating, 5.0);
    }

    #[test]
    fn test_unknown_student_falls_back_to_item_bias() {
        let prediction = model().predict("stranger", 0).unwrap();
        assert!((prediction.estimated_rating - 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_student_and_item_is_global_mean() {
        assert_eq!(model().predict("stranger", 99).unwrap().estimated_rating, 3.0);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let mut m = model();
        m.items.insert(
            2,
            LatentVector {
                bias: 0.0,
                factors: vec![1.0],
            },
        );
        assert!(matches!(
            m.predict("s1", 2),
            Err(ModelError::DimensionMismatch { student: 2, item: 1 })
        ));
    }

    #[test]
    fn test_non_finite_estimate_is_an_error() {
        let mut m = model();
        m.global_mean = f64::NAN;
        assert!(matches!(m.predict("s1", 0), Err(ModelError::NonFinite { .. })));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        assert!(SvdModel::load("/nonexistent/svd_model.json").is_err());
    }
}
