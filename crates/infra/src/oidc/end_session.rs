//! RP-initiated logout towards the provider's end-session endpoint

use async_trait::async_trait;
use oidc_rp_core::EndSessionEndpoint;
use oidc_rp_domain::EndSessionRequest;
use reqwest::Method;
use tracing::debug;

use crate::http::HttpClient;

/// [`EndSessionEndpoint`] over HTTP.
///
/// The wrapped client must be built with redirects disabled so that a `302`
/// acknowledgment reaches the caller instead of being followed.
#[derive(Clone)]
pub struct HttpEndSessionClient {
    http: HttpClient,
}

impl HttpEndSessionClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl EndSessionEndpoint for HttpEndSessionClient {
    async fn end_session(&self, request: &EndSessionRequest) -> Result<u16, String> {
        let response = self
            .http
            .send(self.http.request(Method::GET, request.to_url()))
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status().as_u16();
        debug!(status, "End-session endpoint responded");
        Ok(status)
    }
}
