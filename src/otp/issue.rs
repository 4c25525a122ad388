//! Current-code retrieval for both credential kinds.

use crate::credential::{CredentialKind, CredentialRepository};
use crate::error::Result;
use crate::otp::{generate, unix_now};

/// Code issued for a credential, with the kind-specific metadata callers
/// need to correlate it.
#[derive(Debug, PartialEq, Eq)]
pub enum IssuedCode {
    Totp {
        code: String,
        seconds_remaining: u64,
    },
    Hotp {
        code: String,
        counter: u64,
    },
}

/// Compute the current code for `name`.
///
/// Time-based retrieval is stateless and returns the same code for every
/// call within a time step. Counter-based retrieval consumes the stored
/// counter: the code is computed at the current value, then the counter
/// atomically advances by one; `counter` in the result is the value the
/// code was computed at.
pub async fn current_code(
    repository: &CredentialRepository,
    name: &str,
) -> Result<IssuedCode> {
    current_code_at(repository, name, unix_now()?).await
}

pub(crate) async fn current_code_at(
    repository: &CredentialRepository,
    name: &str,
    now: u64,
) -> Result<IssuedCode> {
    let mut credential = repository.find_by_name(name).await?;
    let key = credential.key_bytes()?;

    match credential.kind {
        CredentialKind::Totp => {
            let period = credential.period();
            let code = generate(
                &key,
                credential.algorithm,
                credential.digits,
                now / period,
            )?;

            Ok(IssuedCode::Totp {
                code,
                seconds_remaining: period - now % period,
            })
        },
        CredentialKind::Hotp => loop {
            let counter = credential.counter_value();
            let code = generate(
                &key,
                credential.algorithm,
                credential.digits,
                counter,
            )?;

            // Read-generate-advance must be one logical transaction: the
            // code is published only if no concurrent caller consumed this
            // counter slot first.
            if repository
                .compare_and_swap_counter(
                    name,
                    counter as i64,
                    counter as i64 + 1,
                )
                .await?
            {
                return Ok(IssuedCode::Hotp { code, counter });
            }

            credential = repository.find_by_name(name).await?;
        },
    }
}
