use std::collections::HashSet;

use crate::models::Category;

/// Offered categories minus the ones already taken
///
/// Deduplicates while keeping the order in which each category first appears.
pub fn filter_candidates(all: &[Category], taken: &HashSet<Category>) -> Vec<Category> {
    let mut seen: HashSet<&str> = HashSet::new();

    all.iter()
        .filter(|category| !taken.contains(category.as_str()))
        .filter(|category| seen.insert(category.as_str()))
        .cloned()
        .collect()
}
