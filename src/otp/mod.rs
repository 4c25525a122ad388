//! One-time code engine: generation, retrieval and verification.

mod generate;
mod issue;
mod verify;

pub use generate::*;
pub use issue::*;
pub use verify::*;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, ServerError};

/// Seconds since the Unix epoch.
pub(crate) fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .map_err(|_| ServerError::Internal {
            details: "system clock is before the Unix epoch".into(),
        })
}
