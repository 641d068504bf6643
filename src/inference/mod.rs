//! Rating-prediction seam.
//!
//! The engine only consumes predictions; how the artifact was trained is not
//! its concern. Implementations are loaded once and shared read-only across
//! concurrent requests.

pub mod svd;

pub use svd::SvdModel;

/// A single estimate for (student, category index)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub estimated_rating: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("factor dimension mismatch: student has {student}, item has {item}")]
    DimensionMismatch { student: usize, item: usize },

    #[error("non-finite estimate for student {student_id}, item {item}")]
    NonFinite { student_id: String, item: usize },
}

/// Pretrained latent-factor predictor
#[cfg_attr(test, mockall::automock)]
pub trait RatingModel: Send + Sync {
    fn predict(&self, student_id: &str, category_index: usize) -> Result<Prediction, ModelError>;

    /// Model name for logging and debugging
    fn name(&self) -> &'static str;
}
