//! Candidate code verification with bounded window search.

use constant_time_eq::constant_time_eq;

use crate::config::Otp;
use crate::credential::{Credential, CredentialKind, CredentialRepository};
use crate::error::Result;
use crate::otp::{generate, unix_now};

/// Check `candidate` against the accepted window of the credential.
///
/// Time-based verification tolerates `totp_drift` steps of clock drift on
/// each side and never mutates state. Counter-based verification searches
/// `hotp_look_ahead` slots starting at the stored counter and consumes the
/// matched slot exactly once, even under concurrent attempts.
pub async fn verify(
    repository: &CredentialRepository,
    name: &str,
    candidate: &str,
    windows: &Otp,
) -> Result<bool> {
    verify_at(repository, name, candidate, windows, unix_now()?).await
}

pub(crate) async fn verify_at(
    repository: &CredentialRepository,
    name: &str,
    candidate: &str,
    windows: &Otp,
    now: u64,
) -> Result<bool> {
    let credential = repository.find_by_name(name).await?;
    let key = credential.key_bytes()?;

    match credential.kind {
        CredentialKind::Totp => {
            verify_totp(&credential, &key, candidate, windows.totp_drift, now)
        },
        CredentialKind::Hotp => {
            verify_hotp(
                repository,
                credential,
                &key,
                candidate,
                windows.hotp_look_ahead,
            )
            .await
        },
    }
}

/// Try each step of the drift window in ascending order.
fn verify_totp(
    credential: &Credential,
    key: &[u8],
    candidate: &str,
    drift: u64,
    now: u64,
) -> Result<bool> {
    let step = now / credential.period();

    for moving_factor in
        step.saturating_sub(drift)..=step.saturating_add(drift)
    {
        let code = generate(
            key,
            credential.algorithm,
            credential.digits,
            moving_factor,
        )?;
        if constant_time_eq(code.as_bytes(), candidate.as_bytes()) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Search the look-ahead window starting at the stored counter.
///
/// A match at offset `i` persists `counter + i + 1`, consuming the matched
/// slot and everything skipped before it. A miss leaves the counter
/// untouched so legitimate near-future codes stay inside the window for a
/// later attempt. Counters below the stored value are never searched:
/// already consumed codes cannot replay.
async fn verify_hotp(
    repository: &CredentialRepository,
    mut credential: Credential,
    key: &[u8],
    candidate: &str,
    look_ahead: u64,
) -> Result<bool> {
    loop {
        let base = credential.counter_value();

        let mut matched = None;
        for offset in 0..look_ahead {
            let code = generate(
                key,
                credential.algorithm,
                credential.digits,
                base + offset,
            )?;
            if constant_time_eq(code.as_bytes(), candidate.as_bytes()) {
                matched = Some(offset);
                break;
            }
        }

        let Some(offset) = matched else {
            return Ok(false);
        };

        // Losing the swap means a concurrent verification advanced the
        // counter first. The re-observed value is strictly larger, so the
        // retry terminates and a slot is never consumed twice.
        if repository
            .compare_and_swap_counter(
                &credential.name,
                base as i64,
                (base + offset + 1) as i64,
            )
            .await?
        {
            return Ok(true);
        }

        credential = repository.find_by_name(&credential.name).await?;
    }
}
