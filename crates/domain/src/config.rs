//! Relying party configuration
//!
//! Plain data; loading from the environment or a file lives in the infra
//! crate's `config::loader`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_SCOPES,
    DEFAULT_SESSION_IDLE_SECONDS, OPENID_SCOPE,
};
use crate::errors::{RelyingPartyError, Result};

/// How the client authenticates itself at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuth {
    /// HTTP Basic with client id and secret.
    #[default]
    ClientSecretBasic,
    /// `client_id`/`client_secret` form fields.
    ClientSecretPost,
}

impl std::str::FromStr for TokenEndpointAuth {
    type Err = RelyingPartyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client_secret_basic" => Ok(Self::ClientSecretBasic),
            "client_secret_post" => Ok(Self::ClientSecretPost),
            other => Err(RelyingPartyError::Config(format!(
                "unsupported token endpoint auth method: {other}"
            ))),
        }
    }
}

/// Everything the relying party needs from its deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct RelyingPartyConfig {
    /// Identity provider issuer URL; discovery is resolved against it.
    pub issuer_url: Url,

    pub client_id: String,

    pub client_secret: SecretString,

    /// Registered redirect URI that routes to the login callback.
    pub redirect_uri: Url,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub token_endpoint_auth: TokenEndpointAuth,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,

    /// Skip TLS certificate verification towards the provider.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_session_idle")]
    pub session_idle_timeout_seconds: u64,

    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_session_idle() -> u64 {
    DEFAULT_SESSION_IDLE_SECONDS
}

impl RelyingPartyConfig {
    /// Configuration with defaults for everything but the four required
    /// values.
    #[must_use]
    pub fn new(
        issuer_url: Url,
        client_id: String,
        client_secret: SecretString,
        redirect_uri: Url,
    ) -> Self {
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            scopes: default_scopes(),
            token_endpoint_auth: TokenEndpointAuth::default(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            accept_invalid_certs: false,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            session_idle_timeout_seconds: DEFAULT_SESSION_IDLE_SECONDS,
            secure_cookies: false,
        }
    }

    /// Reject configurations that cannot possibly work.
    ///
    /// # Errors
    /// Returns `RelyingPartyError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(RelyingPartyError::Config("client_id must not be empty".into()));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(RelyingPartyError::Config("client_secret must not be empty".into()));
        }
        if self.scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(RelyingPartyError::Config("at least one scope is required".into()));
        }
        if !matches!(self.redirect_uri.scheme(), "http" | "https") {
            return Err(RelyingPartyError::Config(format!(
                "redirect_uri must be http(s), got {}",
                self.redirect_uri
            )));
        }
        if self.http_timeout_seconds == 0 {
            return Err(RelyingPartyError::Config("http_timeout_seconds must be > 0".into()));
        }
        Ok(())
    }

    /// Space-separated scope string, always led by `openid`.
    #[must_use]
    pub fn scope_string(&self) -> String {
        let mut scopes = vec![OPENID_SCOPE];
        for scope in &self.scopes {
            let scope = scope.trim();
            if !scope.is_empty() && !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        scopes.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RelyingPartyConfig {
        RelyingPartyConfig::new(
            Url::parse("https://idp.example.com/realms/main").unwrap(),
            "client-1".to_string(),
            SecretString::new("s3cret".to_string()),
            Url::parse("http://localhost:4567/login_callback").unwrap(),
        )
    }

    #[test]
    fn defaults_cover_a_local_deployment() {
        let config = config();
        assert_eq!(config.scope_string(), "openid email profile offline_access");
        assert_eq!(config.bind_address, "127.0.0.1:4567");
        assert_eq!(config.token_endpoint_auth, TokenEndpointAuth::ClientSecretBasic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn scope_string_deduplicates_openid() {
        let mut config = config();
        config.scopes = vec!["openid".into(), "email".into(), "email".into()];
        assert_eq!(config.scope_string(), "openid email");
    }

    #[test]
    fn validate_rejects_empty_secret_and_scopes() {
        let mut config = config();
        config.client_secret = SecretString::new(String::new());
        assert!(matches!(config.validate(), Err(RelyingPartyError::Config(_))));

        let mut config = self::tests::config();
        config.scopes = vec![" ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn auth_method_parses_from_str() {
        assert_eq!(
            "client_secret_post".parse::<TokenEndpointAuth>().unwrap(),
            TokenEndpointAuth::ClientSecretPost
        );
        assert!("private_key_jwt".parse::<TokenEndpointAuth>().is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        assert!(!format!("{:?}", config()).contains("s3cret"));
    }
}
