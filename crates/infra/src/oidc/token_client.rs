//! Token endpoint client
//!
//! Posts authorization-code and refresh-token grants to the provider and
//! strictly decodes the reply. Exactly one request per call.

use async_trait::async_trait;
use oidc_rp_core::TokenEndpoint;
use oidc_rp_domain::constants::{GRANT_AUTHORIZATION_CODE, GRANT_REFRESH_TOKEN};
use oidc_rp_domain::{
    ExchangeError, ProviderMetadata, RelyingPartyConfig, TokenEndpointAuth, TokenResponse,
};
use reqwest::header::ACCEPT;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// [`TokenEndpoint`] over HTTP.
#[derive(Clone)]
pub struct HttpTokenClient {
    http: HttpClient,
    token_endpoint: Url,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    auth: TokenEndpointAuth,
}

impl HttpTokenClient {
    /// `http` should be a single-attempt client.
    pub fn new(http: HttpClient, provider: &ProviderMetadata, config: &RelyingPartyConfig) -> Self {
        Self {
            http,
            token_endpoint: provider.token_endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.to_string(),
            auth: config.token_endpoint_auth,
        }
    }

    async fn request_tokens(
        &self,
        grant_type: &str,
        grant_params: &[(&str, &str)],
    ) -> Result<TokenResponse, ExchangeError> {
        let mut form: Vec<(&str, &str)> = vec![("grant_type", grant_type)];
        form.extend_from_slice(grant_params);

        let mut request = self.http.request(Method::POST, self.token_endpoint.clone());
        match self.auth {
            TokenEndpointAuth::ClientSecretBasic => {
                // RFC 6749 §2.3.1: credentials are form-encoded before Basic.
                request = request.basic_auth(
                    form_encode(&self.client_id),
                    Some(form_encode(self.client_secret.expose_secret())),
                );
            }
            TokenEndpointAuth::ClientSecretPost => {
                form.push(("client_id", &self.client_id));
                form.push(("client_secret", self.client_secret.expose_secret()));
            }
        }
        let request = request.header(ACCEPT, "application/json").form(&form);

        let response =
            self.http.send(request).await.map_err(|err| ExchangeError::from(InfraError(err)))?;
        let status = response.status().as_u16();
        let body =
            response.text().await.map_err(|err| ExchangeError::from(InfraError::from(err)))?;

        if !(200..300).contains(&status) {
            return Err(ExchangeError::Status { status, body });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            ExchangeError::MalformedBody { status, reason: err.to_string(), body: body.clone() }
        })?;
        parsed.validate().map_err(|reason| ExchangeError::MalformedBody { status, reason, body })?;

        debug!(
            grant_type,
            status,
            expires_in = parsed.expires_in,
            has_refresh_token = parsed.refresh_token.is_some(),
            "Token endpoint responded"
        );
        Ok(parsed)
    }
}

fn form_encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[async_trait]
impl TokenEndpoint for HttpTokenClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ExchangeError> {
        self.request_tokens(
            GRANT_AUTHORIZATION_CODE,
            &[("code", code), ("redirect_uri", &self.redirect_uri)],
        )
        .await
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, ExchangeError> {
        self.request_tokens(GRANT_REFRESH_TOKEN, &[("refresh_token", refresh_token)]).await
    }
}

impl std::fmt::Debug for HttpTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTokenClient")
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("client_id", &self.client_id)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
