//! Provider discovery
//!
//! Fetches `{issuer}/.well-known/openid-configuration` and the JWK Set it
//! points to, once, at startup.

use jsonwebtoken::jwk::JwkSet;
use oidc_rp_domain::constants::DISCOVERY_PATH;
use oidc_rp_domain::{ProviderMetadata, RelyingPartyError, Result};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::http::HttpClient;

/// Fields of the discovery document the relying party depends on.
#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    issuer: String,
    authorization_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
    end_session_endpoint: Url,
    jwks_uri: Url,
}

/// Discover the provider at `issuer_url`.
///
/// `http` may retry; both requests are idempotent GETs.
///
/// # Errors
/// Returns `RelyingPartyError::Discovery` when either document is
/// unreachable, malformed, names a different issuer, or the key set is
/// empty, and `RelyingPartyError::Network` on transport failure.
pub async fn discover(issuer_url: &Url, http: &HttpClient) -> Result<ProviderMetadata> {
    let configured = issuer_url.as_str().trim_end_matches('/');
    let discovery_url = Url::parse(&format!("{configured}/{DISCOVERY_PATH}"))
        .map_err(|e| RelyingPartyError::Config(format!("Invalid issuer URL: {e}")))?;

    let document: DiscoveryDocument = fetch_json(http, &discovery_url).await?;

    if document.issuer.trim_end_matches('/') != configured {
        return Err(RelyingPartyError::Discovery(format!(
            "Issuer mismatch: configured {configured}, provider advertises {}",
            document.issuer
        )));
    }

    let signing_keys: JwkSet = fetch_json(http, &document.jwks_uri).await?;
    if signing_keys.keys.is_empty() {
        return Err(RelyingPartyError::Discovery(format!(
            "JWK Set at {} contains no keys",
            document.jwks_uri
        )));
    }

    info!(
        issuer = %document.issuer,
        keys = signing_keys.keys.len(),
        "Provider discovered"
    );

    Ok(ProviderMetadata {
        issuer: document.issuer,
        authorization_endpoint: document.authorization_endpoint,
        token_endpoint: document.token_endpoint,
        userinfo_endpoint: document.userinfo_endpoint,
        end_session_endpoint: document.end_session_endpoint,
        jwks_uri: document.jwks_uri,
        signing_keys,
    })
}

async fn fetch_json<T: DeserializeOwned>(http: &HttpClient, url: &Url) -> Result<T> {
    let response = http
        .send(http.request(Method::GET, url.clone()).header(ACCEPT, "application/json"))
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!(%url, %status, "Discovery request failed");
        return Err(RelyingPartyError::Discovery(format!("GET {url} returned {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| RelyingPartyError::Network(format!("Failed to read {url}: {e}")))?;
    serde_json::from_slice(&body)
        .map_err(|e| RelyingPartyError::Discovery(format!("Invalid document at {url}: {e}")))
}
