//! Conversions from external infrastructure errors into domain errors.

use oidc_rp_domain::{ExchangeError, RelyingPartyError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RelyingPartyError);

impl From<InfraError> for RelyingPartyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RelyingPartyError> for InfraError {
    fn from(value: RelyingPartyError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRelyingPartyError {
    fn into_relying_party(self) -> RelyingPartyError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RelyingPartyError */
/* -------------------------------------------------------------------------- */

impl IntoRelyingPartyError for HttpError {
    fn into_relying_party(self) -> RelyingPartyError {
        if self.is_timeout() {
            return RelyingPartyError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return RelyingPartyError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return RelyingPartyError::Internal(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            return RelyingPartyError::Network(format!(
                "HTTP {} {}",
                code,
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        RelyingPartyError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_relying_party())
    }
}

/* -------------------------------------------------------------------------- */
/* RelyingPartyError → ExchangeError */
/* -------------------------------------------------------------------------- */

/// A token request that never produced an HTTP response.
impl From<InfraError> for ExchangeError {
    fn from(value: InfraError) -> Self {
        ExchangeError::Request(value.0.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_maps_to_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::SERVICE_UNAVAILABLE))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: RelyingPartyError = InfraError::from(error).into();
        match mapped {
            RelyingPartyError::Network(msg) => assert!(msg.contains("503")),
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refused_connection_becomes_exchange_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let exchange: ExchangeError = InfraError::from(error).into();
        assert!(matches!(exchange, ExchangeError::Request(_)));
        assert_eq!(exchange.status(), None);
    }
}
