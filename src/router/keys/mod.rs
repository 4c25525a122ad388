//! Credential-related HTTP API.

mod create;
mod delete;
mod generate;
mod get;
mod import;
mod list;
mod otp;
mod verify;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /keys` goes to `create`, `GET /keys` goes to `list`.
        .route("/", post(create::handler).get(list::handler))
        // `POST /keys/generate` goes to `generate`.
        .route("/generate", post(generate::handler))
        // `POST /keys/import` goes to `import`.
        .route("/import", post(import::handler))
        // `POST /keys/verify` goes to `verify`.
        .route("/verify", post(verify::handler))
        // `GET` and `DELETE /keys/{name}`.
        .route("/{name}", get(get::handler).delete(delete::handler))
        // `GET /keys/{name}/otp` goes to `otp`.
        .route("/{name}/otp", get(otp::handler))
}
