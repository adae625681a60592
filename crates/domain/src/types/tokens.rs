//! Token endpoint responses and the session token triple
//!
//! [`TokenResponse`] is the strictly-decoded body of a token endpoint reply;
//! [`TokenSet`] is what a session actually holds once a response has been
//! accepted.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TOKEN_LIFETIME_SECONDS;

/// Successful token endpoint response (RFC 6749 §5.1 plus `id_token`).
///
/// Every field the relying party depends on is mandatory: a body missing
/// `id_token` or `expires_in` fails to decode instead of producing a partial
/// token set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub id_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Semantic checks serde cannot express.
    ///
    /// # Errors
    /// Returns a human-readable reason when the token type is not `Bearer`,
    /// the lifetime is not positive or exceeds
    /// [`MAX_TOKEN_LIFETIME_SECONDS`], or a token string is empty.
    pub fn validate(&self) -> Result<(), String> {
        if !self.token_type.eq_ignore_ascii_case("bearer") {
            return Err(format!("unsupported token_type {:?}", self.token_type));
        }
        if self.expires_in <= 0 {
            return Err(format!("expires_in must be positive, got {}", self.expires_in));
        }
        if self.expires_in > MAX_TOKEN_LIFETIME_SECONDS {
            return Err(format!(
                "expires_in {} exceeds the {MAX_TOKEN_LIFETIME_SECONDS}s ceiling",
                self.expires_in
            ));
        }
        if self.access_token.is_empty() {
            return Err("access_token is empty".to_string());
        }
        if self.id_token.is_empty() {
            return Err("id_token is empty".to_string());
        }
        if matches!(self.refresh_token.as_deref(), Some("")) {
            return Err("refresh_token is empty".to_string());
        }
        Ok(())
    }

    /// Convert into a session token set, anchoring expiry at `now`.
    ///
    /// # Errors
    /// Returns a reason when the response fails [`TokenResponse::validate`]
    /// or `now + expires_in` is not a representable instant.
    pub fn into_token_set(self, now: DateTime<Utc>) -> Result<TokenSet, String> {
        self.validate()?;
        let expires_at = TimeDelta::try_seconds(self.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| format!("expires_in {} overflows the expiry instant", self.expires_in))?;

        Ok(TokenSet {
            expires_at,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            id_token: self.id_token,
            scope: self.scope,
        })
    }
}

/// Access/refresh/ID token triple held by an authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,

    /// Absent when the provider issued none (e.g. `offline_access` denied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Raw signed JWT, kept verbatim for `id_token_hint` at logout.
    pub id_token: String,

    /// Access token expiry, `issued_at + expires_in`.
    pub expires_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Replace this set with the result of a refresh.
    ///
    /// Providers may omit `refresh_token` from a refresh response; in that
    /// case the refresh token already held stays in place.
    #[must_use]
    pub fn rotated(&self, mut next: TokenSet) -> TokenSet {
        if next.refresh_token.is_none() {
            next.refresh_token.clone_from(&self.refresh_token);
        }
        next
    }

    /// Whether the access token is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds remaining until the access token expires (negative once past).
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("id_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn response(refresh_token: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "AT1".to_string(),
            token_type: "Bearer".to_string(),
            id_token: "header.payload.signature".to_string(),
            expires_in: 3600,
            refresh_token: refresh_token.map(str::to_string),
            scope: Some("openid email".to_string()),
        }
    }

    #[test]
    fn into_token_set_anchors_expiry_at_now() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let tokens = response(Some("RT1")).into_token_set(now).unwrap();

        assert_eq!(tokens.expires_at, now + Duration::seconds(3600));
        assert_eq!(tokens.access_token, "AT1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("RT1"));
        assert_eq!(tokens.seconds_until_expiry(now), 3600);
        assert!(!tokens.is_expired_at(now));
        assert!(tokens.is_expired_at(now + Duration::seconds(3600)));
    }

    #[test]
    fn rotation_keeps_prior_refresh_token_when_omitted() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let current = response(Some("RT1")).into_token_set(now).unwrap();
        let mut next = response(None).into_token_set(now).unwrap();
        next.access_token = "AT2".to_string();

        let rotated = current.rotated(next);
        assert_eq!(rotated.access_token, "AT2");
        assert_eq!(rotated.refresh_token.as_deref(), Some("RT1"));
    }

    #[test]
    fn rotation_prefers_new_refresh_token() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let current = response(Some("RT1")).into_token_set(now).unwrap();
        let next = response(Some("RT2")).into_token_set(now).unwrap();

        assert_eq!(current.rotated(next).refresh_token.as_deref(), Some("RT2"));
    }

    #[test]
    fn strict_decode_rejects_missing_id_token() {
        let body = r#"{"access_token":"AT","token_type":"Bearer","expires_in":60}"#;
        assert!(serde_json::from_str::<TokenResponse>(body).is_err());
    }

    #[test]
    fn strict_decode_rejects_mistyped_expiry() {
        let body = r#"{"access_token":"AT","token_type":"Bearer","id_token":"x.y.z","expires_in":"60"}"#;
        assert!(serde_json::from_str::<TokenResponse>(body).is_err());
    }

    #[test]
    fn validate_rejects_non_bearer_and_non_positive_lifetimes() {
        let mut resp = response(None);
        resp.token_type = "mac".to_string();
        assert!(resp.validate().is_err());

        let mut resp = response(None);
        resp.expires_in = 0;
        assert!(resp.validate().is_err());

        let mut resp = response(None);
        resp.token_type = "bearer".to_string();
        assert!(resp.validate().is_ok());
    }

    #[test]
    fn oversized_lifetimes_are_rejected_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        let mut resp = response(None);
        resp.expires_in = 10_000_000_000_000;
        assert!(resp.validate().is_err());
        assert!(resp.into_token_set(now).is_err());

        let mut resp = response(None);
        resp.expires_in = i64::MAX;
        assert!(resp.into_token_set(now).is_err());

        let mut resp = response(None);
        resp.expires_in = MAX_TOKEN_LIFETIME_SECONDS;
        let tokens = resp.into_token_set(now).expect("ceiling itself is accepted");
        assert_eq!(tokens.seconds_until_expiry(now), MAX_TOKEN_LIFETIME_SECONDS);
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let tokens = response(Some("RT-secret")).into_token_set(now).unwrap();
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("AT1"));
        assert!(!rendered.contains("RT-secret"));
        assert!(rendered.contains("expires_at"));
    }
}
