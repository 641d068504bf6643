use std::sync::Arc;

use crate::{auth::TokenAuthority, db::Catalog, inference::RatingModel};

/// Shared application state
///
/// Holds no per-request data. The model is immutable after load, and the
/// catalog hands every query attempt its own connection.
pub struct AppState {
    pub catalog: Catalog,
    pub model: Arc<dyn RatingModel>,
    pub tokens: TokenAuthority,
}

impl AppState {
    pub fn new(catalog: Catalog, model: Arc<dyn RatingModel>, tokens: TokenAuthority) -> Self {
        Self {
            catalog,
            model,
            tokens,
        }
    }
}
