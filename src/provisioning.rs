//! `otpauth://` provisioning URI codec, per the Google Authenticator
//! key-URI format:
//! <https://github.com/google/google-authenticator/wiki/Key-Uri-Format>
//!
//! Decoding consumes the raw string produced by an external QR optical
//! decoder; pixel work never happens here.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::credential::{
    Algorithm, Credential, CredentialKind, Digits,
};
use crate::error::{Result, ServerError};
use crate::otp::normalize_secret;

const SCHEME: &str = "otpauth";

/// Credential parameters carried by a parsed provisioning URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    pub name: String,
    pub secret: String,
    pub kind: CredentialKind,
    pub algorithm: Algorithm,
    pub digits: Digits,
    pub period: Option<i64>,
    pub counter: Option<i64>,
    pub issuer: Option<String>,
}

fn invalid(reason: impl Into<String>) -> ServerError {
    ServerError::InvalidUri {
        reason: reason.into(),
    }
}

/// Render the canonical URI for a credential.
///
/// `SHA1` and 6 digits are the authenticator defaults and stay implicit;
/// the moving-factor parameter matching the kind is always written.
pub fn build_uri(credential: &Credential) -> Result<String> {
    let mut url = Url::parse(&format!("{SCHEME}://{}/", credential.kind.as_str()))
        .map_err(|err| ServerError::Internal {
            details: err.to_string(),
        })?;

    let issuer = credential
        .issuer
        .as_deref()
        .filter(|issuer| !issuer.is_empty());
    let label = match issuer {
        Some(issuer) => format!("{issuer}:{}", credential.name),
        None => credential.name.clone(),
    };
    url.set_path(&label);

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("secret", &credential.secret);
        if let Some(issuer) = issuer {
            query.append_pair("issuer", issuer);
        }
        if credential.algorithm != Algorithm::Sha1 {
            query.append_pair("algorithm", credential.algorithm.uri_name());
        }
        if credential.digits != Digits::Six {
            query
                .append_pair("digits", &credential.digits.count().to_string());
        }
        match credential.kind {
            CredentialKind::Totp => {
                query.append_pair("period", &credential.period().to_string());
            },
            CredentialKind::Hotp => {
                query.append_pair(
                    "counter",
                    &credential.counter_value().to_string(),
                );
            },
        }
    }

    Ok(url.to_string())
}

/// Parse a provisioning URI back into credential parameters.
///
/// Omitted optional parameters map to the encode-side defaults: SHA1,
/// 6 digits, 30-second period, counter 0.
pub fn parse_uri(uri: &str) -> Result<ParsedUri> {
    let url =
        Url::parse(uri.trim()).map_err(|err| invalid(err.to_string()))?;

    if url.scheme() != SCHEME {
        return Err(invalid(format!(
            "expected '{SCHEME}' scheme, got '{}'",
            url.scheme()
        )));
    }

    let kind = match url.host_str() {
        Some("totp") => CredentialKind::Totp,
        Some("hotp") => CredentialKind::Hotp,
        other => {
            return Err(invalid(format!(
                "unrecognized credential kind {other:?}"
            )));
        },
    };

    let path = url.path();
    let label = percent_decode_str(path.strip_prefix('/').unwrap_or(path))
        .decode_utf8()
        .map_err(|_| invalid("label is not valid UTF-8"))?;

    let (path_issuer, name) = match label.split_once(':') {
        Some((issuer, name)) => {
            (Some(issuer.trim().to_owned()), name.trim().to_owned())
        },
        None => (None, label.trim().to_owned()),
    };

    let mut secret = None;
    let mut issuer = None;
    let mut algorithm = Algorithm::default();
    let mut digits = Digits::default();
    let mut period = None;
    let mut counter = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "secret" => secret = Some(normalize_secret(&value)),
            "issuer" => issuer = Some(value.into_owned()),
            "algorithm" => {
                algorithm =
                    Algorithm::from_uri_name(&value).ok_or_else(|| {
                        invalid(format!("unsupported algorithm '{value}'"))
                    })?;
            },
            "digits" => {
                digits = value
                    .parse::<u8>()
                    .ok()
                    .and_then(|digits| Digits::try_from(digits).ok())
                    .ok_or_else(|| {
                        invalid(format!("digits must be 6 or 8, got '{value}'"))
                    })?;
            },
            "period" => {
                period = Some(
                    value
                        .parse::<i64>()
                        .ok()
                        .filter(|period| *period > 0)
                        .ok_or_else(|| {
                            invalid(format!(
                                "period must be a positive integer, got '{value}'"
                            ))
                        })?,
                );
            },
            "counter" => {
                counter = Some(
                    value
                        .parse::<i64>()
                        .ok()
                        .filter(|counter| *counter >= 0)
                        .ok_or_else(|| {
                            invalid(format!(
                                "counter must be a non-negative integer, got '{value}'"
                            ))
                        })?,
                );
            },
            // Unknown parameters are ignored.
            _ => {},
        }
    }

    let Some(secret) = secret.filter(|secret| !secret.is_empty()) else {
        return Err(invalid("missing 'secret' parameter"));
    };

    Ok(ParsedUri {
        name,
        secret,
        kind,
        algorithm,
        digits,
        period,
        counter,
        issuer: issuer
            .or(path_issuer)
            .filter(|issuer| !issuer.is_empty()),
    })
}
