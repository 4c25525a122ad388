//! Telemetry logic.
//! Structured logging through `tracing`.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "otpd=info,tower_http=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default directives.
pub fn setup() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
