//! Fetch a single credential view.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::credential::Credential;
use crate::error::Result;

/// Handler to fetch one credential by name.
pub async fn handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Credential>> {
    Ok(Json(state.credentials.find_by_name(&name).await?))
}
