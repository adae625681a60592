//! Deterministic fixtures for ID Token and provider tests
//!
//! `signing_key.pem` is published in [`test_jwks`] under [`TEST_KID`];
//! `foreign_key.pem` is not published anywhere.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use oidc_rp_domain::{ProviderMetadata, RelyingPartyConfig, TokenResponse};
use secrecy::SecretString;
use serde_json::{json, Value};
use url::Url;

pub const TEST_ISSUER: &str = "https://idp.example.com";
pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-secret";
pub const TEST_REDIRECT_URI: &str = "http://localhost:4567/login_callback";
pub const TEST_KID: &str = "test-key-1";

const SIGNING_KEY_PEM: &[u8] = include_bytes!("fixtures/signing_key.pem");
const FOREIGN_KEY_PEM: &[u8] = include_bytes!("fixtures/foreign_key.pem");

const SIGNING_KEY_N: &str = "yOltN1V6bKrIe9LfDcxATPoiMBraXLpC5AglERetrwDp9r8Hd4BRziVz10DVYjSBbwJ4UraX0Q-C4-WsTK0FUmaX5hXXUpIOOJnCWvvpA3iCO5bF2HaWaavDEmj7_9xiSIYX-XtEE3KM1MgkgwjXcmbquSOiQh4yYDxFy6ZGJmaHOxe3vEv1vo-VaPjy9DXcgLnl2xxf1DsN6DfmVixZ_dID9gRxC8M6_0O1FdeJtNVOcbmPfXbB8YO57qg7vtBa8fuzPsUn_iQzN_CKaWwf0pbvALtfgnm-dB8kj8NsLKRGf5jDWszZziX2G0Plo1pnVU1Q1H6nkI2qugQuuBb5Sw";
const SIGNING_KEY_E: &str = "AQAB";

/// Public half of the signing key as a JWK Set.
#[must_use]
pub fn test_jwks() -> JwkSet {
    serde_json::from_value(test_jwks_json()).expect("fixture JWKS is valid")
}

/// The JWK Set document as served by a provider's `jwks_uri`.
#[must_use]
pub fn test_jwks_json() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": TEST_KID,
            "n": SIGNING_KEY_N,
            "e": SIGNING_KEY_E,
        }]
    })
}

/// Standard claims for `test-client`, issued at `now`, valid five minutes.
#[must_use]
pub fn claims_for(now: DateTime<Utc>, nonce: Option<&str>) -> Value {
    let mut claims = json!({
        "iss": TEST_ISSUER,
        "sub": "user-1",
        "aud": TEST_CLIENT_ID,
        "iat": now.timestamp(),
        "exp": (now + Duration::minutes(5)).timestamp(),
    });
    if let Some(nonce) = nonce {
        claims["nonce"] = json!(nonce);
    }
    claims
}

fn sign(claims: &Value, kid: Option<&str>, pem: &[u8]) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem).expect("fixture key is valid PEM");
    jsonwebtoken::encode(&header, claims, &key).expect("signing succeeds")
}

/// RS256 token signed by the published key.
#[must_use]
pub fn sign_id_token(claims: &Value) -> String {
    sign(claims, Some(TEST_KID), SIGNING_KEY_PEM)
}

#[must_use]
pub fn sign_id_token_with_kid(claims: &Value, kid: &str) -> String {
    sign(claims, Some(kid), SIGNING_KEY_PEM)
}

#[must_use]
pub fn sign_id_token_without_kid(claims: &Value) -> String {
    sign(claims, None, SIGNING_KEY_PEM)
}

/// RS256 token claiming [`TEST_KID`] but signed by an unpublished key.
#[must_use]
pub fn sign_with_foreign_key(claims: &Value) -> String {
    sign(claims, Some(TEST_KID), FOREIGN_KEY_PEM)
}

/// Provider metadata for [`TEST_ISSUER`] with endpoints under `base`.
///
/// `base` is usually a wiremock server URI.
#[must_use]
pub fn test_provider(base: &str) -> ProviderMetadata {
    let base = base.trim_end_matches('/');
    let endpoint = |path: &str| Url::parse(&format!("{base}{path}")).expect("valid base URL");
    ProviderMetadata {
        issuer: TEST_ISSUER.to_string(),
        authorization_endpoint: endpoint("/authorize"),
        token_endpoint: endpoint("/token"),
        userinfo_endpoint: endpoint("/userinfo"),
        end_session_endpoint: endpoint("/logout"),
        jwks_uri: endpoint("/jwks"),
        signing_keys: test_jwks(),
    }
}

/// Configuration registered as [`TEST_CLIENT_ID`] with default scopes.
#[must_use]
pub fn test_config() -> RelyingPartyConfig {
    RelyingPartyConfig::new(
        Url::parse(TEST_ISSUER).expect("valid issuer"),
        TEST_CLIENT_ID.to_string(),
        SecretString::new(TEST_CLIENT_SECRET.to_string()),
        Url::parse(TEST_REDIRECT_URI).expect("valid redirect URI"),
    )
}

/// Bearer response valid for an hour.
#[must_use]
pub fn token_response(id_token: &str, refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: "AT1".to_string(),
        token_type: "Bearer".to_string(),
        id_token: id_token.to_string(),
        expires_in: 3600,
        refresh_token: refresh_token.map(str::to_string),
        scope: Some("openid email profile offline_access".to_string()),
    }
}
