//! Register a credential from a decoded provisioning URI.
//!
//! The URI text is what an external QR optical decoder produced from an
//! image; only its string output is consumed here.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::credential::Credential;
use crate::error::{Result, ServerError};
use crate::provisioning;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1))]
    pub uri: String,
    /// Overrides the URI label as stored name.
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
}

/// Handler to import a credential from its provisioning URI.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Credential>)> {
    let parsed = provisioning::parse_uri(&body.uri)?;

    let name = match body.name {
        Some(name) => name,
        None if !parsed.name.is_empty() => parsed.name.clone(),
        None => {
            return Err(ServerError::InvalidUri {
                reason: "name must be provided or encoded in the URI label"
                    .into(),
            });
        },
    };

    let credential = Credential::new(
        name,
        &parsed.secret,
        parsed.kind,
        parsed.algorithm,
        parsed.digits,
        parsed.period,
        parsed.counter,
        parsed.issuer,
    )?;

    state.credentials.insert_unique(&credential).await?;

    Ok((StatusCode::CREATED, Json(credential)))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_import_handler() {
        let state = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            app,
            Method::POST,
            "/keys/import",
            json!({
                "uri": "otpauth://hotp/Example:mail?secret=JBSWY3DPEHPK3PXP&issuer=Example&counter=5",
            })
            .to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["name"], "mail");
        assert_eq!(body["type"], "hotp");
        assert_eq!(body["counter"], 5);
        assert_eq!(body["issuer"], "Example");
        assert!(body.get("secret").is_none());

        let stored = state.credentials.find_by_name("mail").await.unwrap();
        assert_eq!(stored.secret, "JBSWY3DPEHPK3PXP");
    }

    #[tokio::test]
    async fn test_import_name_override() {
        let state = router::state().await;
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/keys/import",
            json!({
                "uri": "otpauth://totp/ignored?secret=JBSWY3DPEHPK3PXP",
                "name": "renamed",
            })
            .to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["name"], "renamed");
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_uris() {
        let state = router::state().await;
        let app = app(state);

        for uri in [
            "https://example.com",
            "otpauth://totp/Test?issuer=X",
            "otpauth://totp/?secret=JBSWY3DPEHPK3PXP",
        ] {
            let response = make_request(
                app.clone(),
                Method::POST,
                "/keys/import",
                json!({ "uri": uri }).to_string(),
            )
            .await;
            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "'{uri}' was not rejected",
            );
        }
    }

    #[tokio::test]
    async fn test_import_duplicate_name_conflicts() {
        let state = router::state().await;
        let app = app(state);

        let body = json!({
            "uri": "otpauth://totp/mail?secret=JBSWY3DPEHPK3PXP",
        })
        .to_string();

        let response =
            make_request(app.clone(), Method::POST, "/keys/import", body.clone())
                .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response =
            make_request(app, Method::POST, "/keys/import", body).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
