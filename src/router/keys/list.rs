//! List stored credential views.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::credential::Credential;
use crate::error::Result;

/// Handler to list credentials, newest first. Secrets never appear.
pub async fn handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Credential>>> {
    Ok(Json(state.credentials.list_all().await?))
}
