use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::{
    auth::bearer_token,
    error::{AppError, AuthError},
    models::StudentId,
    routes::AppState,
};

/// The student behind a verified bearer token
///
/// Rejection happens before the handler body runs, so a bad credential never
/// reaches the store or the model.
#[derive(Debug, Clone)]
pub struct AuthenticatedStudent {
    pub student_id: StudentId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::Invalid)?),
            None => None,
        };
        let token = bearer_token(header)?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::warn!(error = %e, uri = %parts.uri, "Rejected bearer token");
            e
        })?;

        Ok(Self {
            student_id: StudentId::new(claims.student_id),
        })
    }
}
