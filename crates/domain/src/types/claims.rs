//! Decoded ID Token claims
//!
//! Derived from a raw `id_token` for verification and for display of expiry;
//! never persisted on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// `aud` may be a single string or an array of strings (OIDC Core §2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Audience(Vec<String>);

impl Audience {
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|aud| aud == value)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(aud) => Self(vec![aud]),
            OneOrMany::Many(auds) => Self(auds),
        })
    }
}

/// The subset of ID Token claims the relying party checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(rename = "iss")]
    pub issuer: String,

    #[serde(rename = "sub")]
    pub subject: String,

    #[serde(rename = "aud")]
    pub audience: Audience,

    /// Seconds since the epoch.
    #[serde(rename = "exp")]
    pub expiration: i64,

    /// Seconds since the epoch.
    #[serde(rename = "iat")]
    pub issued_at: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl IdTokenClaims {
    /// `exp` as a timestamp, `None` if out of chrono's range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expiration, 0)
    }

    #[must_use]
    pub fn issued_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.issued_at, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_accepts_string_and_array() {
        let single: IdTokenClaims = serde_json::from_value(serde_json::json!({
            "iss": "https://idp", "sub": "u1", "aud": "client", "exp": 10, "iat": 1
        }))
        .unwrap();
        assert!(single.audience.contains("client"));
        assert!(single.nonce.is_none());

        let many: IdTokenClaims = serde_json::from_value(serde_json::json!({
            "iss": "https://idp", "sub": "u1", "aud": ["other", "client"],
            "exp": 10, "iat": 1, "nonce": "n"
        }))
        .unwrap();
        assert!(many.audience.contains("client"));
        assert_eq!(many.audience.as_slice().len(), 2);
        assert_eq!(many.nonce.as_deref(), Some("n"));
    }

    #[test]
    fn missing_subject_fails_to_decode() {
        let result = serde_json::from_value::<IdTokenClaims>(serde_json::json!({
            "iss": "https://idp", "aud": "client", "exp": 10, "iat": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn expires_at_converts_epoch_seconds() {
        let claims: IdTokenClaims = serde_json::from_value(serde_json::json!({
            "iss": "https://idp", "sub": "u1", "aud": "client", "exp": 1_700_000_000, "iat": 1
        }))
        .unwrap();
        assert_eq!(claims.expires_at().map(|t| t.timestamp()), Some(1_700_000_000));
    }
}
