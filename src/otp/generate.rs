//! HMAC-based one-time code generator.

use base32::Alphabet;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::credential::{Algorithm, Digits};
use crate::error::{Result, ServerError};

const SECRET_BYTES: usize = 20;
const BASE32: Alphabet = Alphabet::Rfc4648 { padding: false };

/// Strip the decorations authenticator exports put around base32 secrets.
pub fn normalize_secret(secret: &str) -> String {
    secret
        .trim()
        .replace([' ', '='], "")
        .to_ascii_uppercase()
}

/// Decode a base32 secret into raw key material.
pub fn decode_secret(secret: &str) -> Option<Vec<u8>> {
    if secret.is_empty() {
        return None;
    }

    base32::decode(BASE32, secret)
}

/// Generate a random 160-bit secret, base32-encoded.
pub fn random_secret() -> String {
    let mut key = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut key);

    base32::encode(BASE32, &key)
}

fn hmac_error(err: hmac::digest::InvalidLength) -> ServerError {
    ServerError::Internal {
        details: err.to_string(),
    }
}

fn hmac_digest(
    algorithm: Algorithm,
    key: &[u8],
    message: &[u8],
) -> Result<Vec<u8>> {
    let digest = match algorithm {
        Algorithm::Sha1 => {
            let mut mac =
                Hmac::<Sha1>::new_from_slice(key).map_err(hmac_error)?;
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        },
        Algorithm::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(key).map_err(hmac_error)?;
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        },
        Algorithm::Sha512 => {
            let mut mac =
                Hmac::<Sha512>::new_from_slice(key).map_err(hmac_error)?;
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        },
    };

    Ok(digest)
}

/// Compute a one-time code for the given moving factor.
///
/// The moving factor is the time-step count for time-based credentials and
/// the stored counter for counter-based ones. Its big-endian 8-byte form is
/// hashed with the keyed digest, then reduced through dynamic truncation
/// (RFC 4226) to `digits` decimal characters, zero-padded.
pub fn generate(
    secret: &[u8],
    algorithm: Algorithm,
    digits: Digits,
    moving_factor: u64,
) -> Result<String> {
    if secret.is_empty() {
        return Err(ServerError::InvalidSecret);
    }

    let result =
        hmac_digest(algorithm, secret, &moving_factor.to_be_bytes())?;

    // Dynamic truncation (RFC 4226).
    let offset = (result[result.len() - 1] & 0x0f) as usize;
    let binary_code = ((result[offset] as u32 & 0x7f) << 24)
        | ((result[offset + 1] as u32) << 16)
        | ((result[offset + 2] as u32) << 8)
        | (result[offset + 3] as u32);

    let code = binary_code % 10u32.pow(digits.count());

    Ok(format!("{:0>width$}", code, width = digits.count() as usize))
}
