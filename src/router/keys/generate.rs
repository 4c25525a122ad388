//! Register a credential with a server-generated secret.
//!
//! The response is the only place the secret ever leaves the store: it
//! carries the base32 secret, the provisioning URI and a QR rendering of
//! it for transfer to an authenticator.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use qrcode::QrCode;
use qrcode::render::svg;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::credential::{Algorithm, Credential, CredentialKind, Digits};
use crate::error::{Result, ServerError};
use crate::otp::random_secret;
use crate::provisioning;
use crate::router::Valid;

const QR_DIMENSIONS: u32 = 256;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
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

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(flatten)]
    pub credential: Credential,
    pub secret: String,
    pub uri: String,
    pub qr_svg: String,
}

/// Handler to create a credential with a fresh random secret.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Response>)> {
    let credential = Credential::new(
        body.name,
        &random_secret(),
        body.r#type,
        body.algorithm,
        body.digits,
        body.period,
        body.counter,
        body.issuer,
    )?;

    state.credentials.insert_unique(&credential).await?;

    let uri = provisioning::build_uri(&credential)?;
    let qr_svg = render_qr(&uri)?;

    Ok((
        StatusCode::CREATED,
        Json(Response {
            secret: credential.secret.clone(),
            credential,
            uri,
            qr_svg,
        }),
    ))
}

/// Render the provisioning URI as an SVG QR code.
fn render_qr(uri: &str) -> Result<String> {
    let code = QrCode::new(uri.as_bytes()).map_err(|err| {
        ServerError::Internal {
            details: err.to_string(),
        }
    })?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(QR_DIMENSIONS, QR_DIMENSIONS)
        .build())
}
