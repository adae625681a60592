//! Provider metadata
//!
//! Immutable description of the identity provider, discovered once at startup
//! and shared read-only for the lifetime of the process.

use jsonwebtoken::jwk::JwkSet;
use serde::{Deserialize, Serialize};
use url::Url;

/// Everything the relying party needs to know about its identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier; ID Tokens must carry exactly this `iss`.
    pub issuer: String,

    pub authorization_endpoint: Url,

    pub token_endpoint: Url,

    pub userinfo_endpoint: Url,

    pub end_session_endpoint: Url,

    /// Where `signing_keys` were fetched from.
    pub jwks_uri: Url,

    /// Public keys the provider signs ID Tokens with.
    pub signing_keys: JwkSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips_with_key_set() {
        let metadata: ProviderMetadata = serde_json::from_value(serde_json::json!({
            "issuer": "https://idp.example.com",
            "authorization_endpoint": "https://idp.example.com/authorize",
            "token_endpoint": "https://idp.example.com/token",
            "userinfo_endpoint": "https://idp.example.com/userinfo",
            "end_session_endpoint": "https://idp.example.com/logout",
            "jwks_uri": "https://idp.example.com/jwks",
            "signing_keys": { "keys": [{ "kty": "oct", "kid": "a", "k": "c2VjcmV0LWE" }] }
        }))
        .unwrap();

        assert_eq!(metadata.signing_keys.keys.len(), 1);
        assert!(metadata.signing_keys.find("a").is_some());
        assert_eq!(metadata.token_endpoint.path(), "/token");
    }
}
