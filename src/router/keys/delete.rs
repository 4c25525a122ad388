//! Remove a credential from the store.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;

/// Handler to delete one credential by name.
pub async fn handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    state.credentials.delete_by_name(&name).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
pub(super) mod tests {
    use super::super::create::tests::totp_body;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_delete_handler() {
        let state = router::state().await;
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::POST,
            "/keys",
            json!(totp_body("mail")).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(
            app.clone(),
            Method::DELETE,
            "/keys/mail",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response =
            make_request(app, Method::GET, "/keys/mail", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_absent_name_is_not_found() {
        let state = router::state().await;
        let app = app(state);

        let response = make_request(
            app,
            Method::DELETE,
            "/keys/ghost",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
