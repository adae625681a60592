//! Login attempts and outbound request descriptions

use serde::{Deserialize, Serialize};
use url::Url;

/// CSRF/replay protection values for one login attempt.
///
/// Created by "begin login", consumed exactly once by a successful
/// "complete login".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub state: String,
    pub nonce: String,
}

/// Description of the authorization request the browser is redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationRequest {
    pub endpoint: Url,
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub state: String,
    pub nonce: String,
}

impl AuthorizationRequest {
    /// Render as the redirect target, preserving any query the endpoint has.
    #[must_use]
    pub fn to_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", &self.response_type)
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("state", &self.state)
            .append_pair("nonce", &self.nonce);
        url
    }
}

/// RP-initiated logout request.
#[derive(Clone, PartialEq, Eq)]
pub struct EndSessionRequest {
    pub endpoint: Url,
    pub id_token_hint: String,
}

impl EndSessionRequest {
    #[must_use]
    pub fn to_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id_token_hint", &self.id_token_hint);
        url
    }
}

impl std::fmt::Debug for EndSessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndSessionRequest")
            .field("endpoint", &self.endpoint.as_str())
            .field("id_token_hint", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_carries_all_parameters() {
        let request = AuthorizationRequest {
            endpoint: Url::parse("https://idp.example.com/authorize").unwrap(),
            response_type: "code".to_string(),
            client_id: "client-1".to_string(),
            redirect_uri: "http://localhost:4567/login_callback".to_string(),
            scope: "openid email profile offline_access".to_string(),
            state: "s1".to_string(),
            nonce: "n1".to_string(),
        };

        let url = request.to_url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/authorize");
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "client-1".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:4567/login_callback".into()
        )));
        assert!(pairs.contains(&("scope".into(), "openid email profile offline_access".into())));
        assert!(pairs.contains(&("state".into(), "s1".into())));
        assert!(pairs.contains(&("nonce".into(), "n1".into())));
    }

    #[test]
    fn end_session_url_appends_hint_to_existing_query() {
        let request = EndSessionRequest {
            endpoint: Url::parse("https://idp.example.com/logout?realm=main").unwrap(),
            id_token_hint: "a.b.c".to_string(),
        };

        let url = request.to_url();
        assert_eq!(url.query(), Some("realm=main&id_token_hint=a.b.c"));
        assert!(!format!("{request:?}").contains("a.b.c"));
    }
}
