//! HTTP routes of otpd.

pub mod keys;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use crate::ServerError;

/// Health check handler.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Json extractor running `validator` checks before the handler.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;

        Ok(Valid(value))
    }
}

#[cfg(test)]
pub(crate) async fn state() -> crate::AppState {
    use std::sync::Arc;

    use crate::config::Configuration;
    use crate::credential::CredentialRepository;
    use crate::database::{Database, memory_pool};

    let pool = memory_pool().await;

    crate::AppState {
        config: Arc::new(Configuration::default()),
        db: Database {
            sqlite: pool.clone(),
        },
        credentials: CredentialRepository::new(pool),
    }
}
