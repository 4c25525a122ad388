//! Current one-time code for a credential.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::AppState;
use crate::credential::CredentialKind;
use crate::error::Result;
use crate::otp::{IssuedCode, current_code};

#[derive(Debug, Serialize)]
pub struct Response {
    pub code: String,
    pub r#type: CredentialKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<u64>,
}

/// Handler to compute the current code.
///
/// Counter-based credentials advance their counter here; `counter` in the
/// response is the value the code was computed at.
pub async fn handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Response>> {
    let response = match current_code(&state.credentials, &name).await? {
        IssuedCode::Totp {
            code,
            seconds_remaining,
        } => Response {
            code,
            r#type: CredentialKind::Totp,
            time_remaining: Some(seconds_remaining),
            counter: None,
        },
        IssuedCode::Hotp { code, counter } => Response {
            code,
            r#type: CredentialKind::Hotp,
            time_remaining: None,
            counter: Some(counter),
        },
    };

    Ok(Json(response))
}
