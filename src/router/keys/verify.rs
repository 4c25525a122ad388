//! Verify a candidate code against a credential.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub valid: bool,
}

/// Handler to verify a one-time code.
///
/// A matching counter-based code consumes its counter slot; a miss is a
/// definite `valid: false` and mutates nothing.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let valid = crate::otp::verify(
        &state.credentials,
        &body.name,
        &body.code,
        &state.config.otp,
    )
    .await?;

    Ok(Json(Response { valid }))
}

#[cfg(test)]
pub(super) mod tests {
    use super::super::create::tests::{hotp_body, totp_body};
    use super::*;
    use crate::credential::{Algorithm, Digits};
    use crate::otp::{decode_secret, generate, unix_now};
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;

    const SECRET: &str = "JBSWY3DPEHPK3PXP";

    fn code_at(moving_factor: u64) -> String {
        generate(
            &decode_secret(SECRET).unwrap(),
            Algorithm::Sha1,
            Digits::Six,
            moving_factor,
        )
        .unwrap()
    }

    async fn check(app: axum::Router, name: &str, code: &str) -> bool {
        let response = make_request(
            app,
            Method::POST,
            "/keys/verify",
            json!(Body {
                name: name.into(),
                code: code.into(),
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        body.valid
    }

    #[tokio::test]
    async fn test_verify_totp() {
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

        // Computed against the same secret and clock; the drift window
        // covers a step boundary crossed between here and the handler.
        let code = code_at(unix_now().unwrap() / 30);
        assert!(check(app.clone(), "mail", &code).await);

        assert!(!check(app, "mail", "000000").await);
    }

    #[tokio::test]
    async fn test_verify_hotp_consumes_and_rejects_replay() {
        let state = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/keys",
            json!(hotp_body("vpn")).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        assert!(check(app.clone(), "vpn", &code_at(0)).await);
        assert!(!check(app.clone(), "vpn", &code_at(0)).await);
        assert!(check(app.clone(), "vpn", &code_at(1)).await);

        let stored = state.credentials.find_by_name("vpn").await.unwrap();
        assert_eq!(stored.counter, Some(2));
    }

    #[tokio::test]
    async fn test_verify_hotp_look_ahead() {
        let state = router::state().await;
        let app = app(state.clone());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/keys",
            json!(hotp_body("vpn")).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        // Skipping counters 0 and 1 stays inside the window.
        assert!(check(app.clone(), "vpn", &code_at(2)).await);
        assert!(check(app, "vpn", &code_at(3)).await);

        let stored = state.credentials.find_by_name("vpn").await.unwrap();
        assert_eq!(stored.counter, Some(4));
    }

    #[tokio::test]
    async fn test_verify_unknown_name_is_not_found() {
        let state = router::state().await;
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/keys/verify",
            json!(Body {
                name: "ghost".into(),
                code: "123456".into(),
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
