//! Per-request database session

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use storage::Session;

use crate::{error::ApiError, AppState};

/// Extractor that checks out one connection for the lifetime of a request.
///
/// The connection is returned to the pool when the handler drops it, whether
/// the handler succeeded or not.
pub struct DbSession(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for DbSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = state.database.session().await?;
        Ok(DbSession(session))
    }
}
