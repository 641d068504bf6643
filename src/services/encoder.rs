use std::collections::{BTreeSet, HashMap};

use crate::error::{AppError, AppResult};

/// Stable bidirectional mapping between category labels and dense indices
///
/// Indices follow sorted label order, so the mapping depends only on the
/// fitted universe and not on the order labels arrived in.
#[derive(Debug, Clone, Default)]
pub struct CategoryEncoder {
    labels: Vec<String>,
    indices: HashMap<String, usize>,
}

impl CategoryEncoder {
    /// Fits the encoder on the full category universe
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        let labels: Vec<String> = sorted.into_iter().collect();
        let indices = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.clone(), index))
            .collect();

        Self { labels, indices }
    }

    /// Fails for labels outside the fitted universe
    pub fn encode(&self, label: &str) -> AppResult<usize> {
        self.indices
            .get(label)
            .copied()
            .ok_or_else(|| AppError::UnknownCategory(label.to_string()))
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
