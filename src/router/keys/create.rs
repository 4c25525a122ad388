//! Register a credential with a caller-supplied secret.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::credential::{Algorithm, Credential, CredentialKind, Digits};
use crate::error::Result;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1))]
    pub secret: String,
    pub r#type: CredentialKind,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub digits: Digits,
    #[validate(range(min = 1))]
    pub period: Option<i64>,
    #[validate(range(min = 0))]
    pub counter: Option<i64>,
    #[validate(length(min = 1, max = 64))]
    pub issuer: Option<String>,
}

/// Handler to create a credential.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Credential>)> {
    let credential = Credential::new(
        body.name,
        &body.secret,
        body.r#type,
        body.algorithm,
        body.digits,
        body.period,
        body.counter,
        body.issuer,
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

    pub fn totp_body(name: &str) -> Body {
        Body {
            name: name.into(),
            secret: "JBSWY3DPEHPK3PXP".into(),
            r#type: CredentialKind::Totp,
            algorithm: Algorithm::Sha1,
            digits: Digits::Six,
            period: None,
            counter: None,
            issuer: None,
        }
    }

    pub fn hotp_body(name: &str) -> Body {
        Body {
            r#type: CredentialKind::Hotp,
            ..totp_body(name)
        }
    }

    #[tokio::test]
    async fn test_create_handler() {
        let state = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            app,
            Method::POST,
            "/keys",
            json!(totp_body("mail")).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["name"], "mail");
        assert_eq!(body["type"], "totp");
        assert_eq!(body["algorithm"], "sha1");
        assert_eq!(body["digits"], 6);
        assert_eq!(body["period"], 30);
        assert!(body.get("secret").is_none());
        assert!(body.get("counter").is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let state = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/keys",
            json!(totp_body("mail")).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let mut duplicate = hotp_body("mail");
        duplicate.secret = "MFRGGZDFMZTWQ2LK".into();
        let response = make_request(
            app,
            Method::POST,
            "/keys",
            json!(duplicate).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // First credential's data is unchanged.
        let stored = state.credentials.find_by_name("mail").await.unwrap();
        assert_eq!(stored.kind, CredentialKind::Totp);
        assert_eq!(stored.secret, "JBSWY3DPEHPK3PXP");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_parameters() {
        let state = router::state().await;
        let app = app(state);

        // digits outside {6, 8}.
        let response = make_request(
            app.clone(),
            Method::POST,
            "/keys",
            json!({
                "name": "mail",
                "secret": "JBSWY3DPEHPK3PXP",
                "type": "totp",
                "digits": 7,
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // unknown algorithm.
        let response = make_request(
            app.clone(),
            Method::POST,
            "/keys",
            json!({
                "name": "mail",
                "secret": "JBSWY3DPEHPK3PXP",
                "type": "totp",
                "algorithm": "md5",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // secret that does not decode as base32.
        let response = make_request(
            app,
            Method::POST,
            "/keys",
            json!({
                "name": "mail",
                "secret": "not base32 !",
                "type": "totp",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
