//! Credential records persisted by the store.

mod repository;

pub use repository::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::otp;

pub const DEFAULT_PERIOD: i64 = 30;

/// Whether codes are derived from wall-clock time or a stored counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Totp,
    Hotp,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Totp => "totp",
            Self::Hotp => "hotp",
        }
    }
}

impl TryFrom<String> for CredentialKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "totp" => Ok(Self::Totp),
            "hotp" => Ok(Self::Hotp),
            _ => Err(format!("unknown credential kind '{value}'")),
        }
    }
}

/// Keyed-hash primitive used to derive codes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Spelling used by `otpauth://` URIs.
    pub fn uri_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    pub fn from_uri_name(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "SHA1" => Some(Self::Sha1),
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(format!("unknown algorithm '{value}'")),
        }
    }
}

/// Output code length, restricted to the two lengths authenticators accept.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Digits {
    #[default]
    Six,
    Eight,
}

impl Digits {
    pub fn count(&self) -> u32 {
        match self {
            Self::Six => 6,
            Self::Eight => 8,
        }
    }
}

impl TryFrom<u8> for Digits {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            6 => Ok(Self::Six),
            8 => Ok(Self::Eight),
            _ => Err(format!("digits must be 6 or 8, got {value}")),
        }
    }
}

impl TryFrom<i64> for Digits {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| format!("digits must be 6 or 8, got {value}"))
            .and_then(Digits::try_from)
    }
}

impl From<Digits> for u8 {
    fn from(digits: Digits) -> u8 {
        digits.count() as u8
    }
}

/// Credential as saved on database.
///
/// `secret` is write-once and never serialized: views built from this
/// struct cannot leak key material.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Credential {
    pub name: String,
    #[serde(skip)]
    pub secret: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: CredentialKind,
    #[sqlx(try_from = "String")]
    pub algorithm: Algorithm,
    #[sqlx(try_from = "i64")]
    pub digits: Digits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from creation parameters, normalizing the secret
    /// and applying the kind-specific defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        secret: &str,
        kind: CredentialKind,
        algorithm: Algorithm,
        digits: Digits,
        period: Option<i64>,
        counter: Option<i64>,
        issuer: Option<String>,
    ) -> Result<Self> {
        let secret = otp::normalize_secret(secret);
        if otp::decode_secret(&secret).is_none() {
            return Err(ServerError::InvalidSecret);
        }

        // Only the parameter matching the kind is stored.
        let (period, counter) = match kind {
            CredentialKind::Totp => {
                (Some(period.unwrap_or(DEFAULT_PERIOD)), None)
            },
            CredentialKind::Hotp => (None, Some(counter.unwrap_or(0))),
        };

        Ok(Self {
            name,
            secret,
            kind,
            algorithm,
            digits,
            period,
            counter,
            issuer,
            created_at: Utc::now(),
        })
    }

    /// Time step length in seconds, meaningful for time-based credentials.
    pub fn period(&self) -> u64 {
        self.period.unwrap_or(DEFAULT_PERIOD).max(1) as u64
    }

    /// Next moving factor to try, meaningful for counter-based credentials.
    pub fn counter_value(&self) -> u64 {
        self.counter.unwrap_or(0).max(0) as u64
    }

    /// Raw key material decoded from the base32 representation at rest.
    pub fn key_bytes(&self) -> Result<Vec<u8>> {
        otp::decode_secret(&self.secret).ok_or_else(|| {
            ServerError::Internal {
                details: format!(
                    "stored secret for '{}' is not valid base32",
                    self.name
                ),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults() {
        let totp = Credential::new(
            "t".into(),
            "JBSWY3DPEHPK3PXP",
            CredentialKind::Totp,
            Algorithm::Sha1,
            Digits::Six,
            None,
            Some(4),
            None,
        )
        .unwrap();
        assert_eq!(totp.period, Some(DEFAULT_PERIOD));
        assert_eq!(totp.counter, None);

        let hotp = Credential::new(
            "h".into(),
            "JBSWY3DPEHPK3PXP",
            CredentialKind::Hotp,
            Algorithm::Sha1,
            Digits::Six,
            Some(60),
            None,
            None,
        )
        .unwrap();
        assert_eq!(hotp.period, None);
        assert_eq!(hotp.counter, Some(0));
    }

    #[test]
    fn test_secret_is_normalized_and_checked() {
        let credential = Credential::new(
            "t".into(),
            " jbswy3dpehpk3pxp== ",
            CredentialKind::Totp,
            Algorithm::Sha1,
            Digits::Six,
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(credential.secret, "JBSWY3DPEHPK3PXP");

        let err = Credential::new(
            "t".into(),
            "not base32 at all!",
            CredentialKind::Totp,
            Algorithm::Sha1,
            Digits::Six,
            None,
            None,
            None,
        );
        assert!(matches!(err, Err(ServerError::InvalidSecret)));
    }

    #[test]
    fn test_views_never_serialize_secret() {
        let credential = Credential::new(
            "mail".into(),
            "JBSWY3DPEHPK3PXP",
            CredentialKind::Hotp,
            Algorithm::Sha256,
            Digits::Eight,
            None,
            Some(3),
            Some("Example".into()),
        )
        .unwrap();

        let json = serde_json::to_value(&credential).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["type"], "hotp");
        assert_eq!(json["algorithm"], "sha256");
        assert_eq!(json["digits"], 8);
        assert_eq!(json["counter"], 3);
    }
}
