//! Authentication state machine
//!
//! [`AuthService`] drives one session through
//! `Anonymous -> Pending -> Authenticated -> Anonymous`. Each operation takes
//! the session already locked by the caller and mutates it only after every
//! provider call has returned, so a request dropped mid-exchange leaves the
//! session exactly as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oidc_rp_domain::constants::RESPONSE_TYPE_CODE;
use oidc_rp_domain::{
    AuthError, AuthorizationRequest, EndSessionRequest, ExchangeError, IdTokenClaims,
    ProviderMetadata, RelyingPartyConfig, TokenResponse, TokenSet,
};
use tracing::{debug, info, warn};

use super::ports::{Clock, EndSessionEndpoint, TokenEndpoint};
use super::session::SessionState;
use super::tokens::{new_login_attempt, validate_state};
use super::verifier::{verify_id_token, Expectations};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Access token expiry, `now + expires_in`.
    pub expires_at: DateTime<Utc>,
    pub claims: IdTokenClaims,
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub expires_at: DateTime<Utc>,
    pub claims: IdTokenClaims,
    /// Whether the provider issued a new refresh token.
    pub refresh_token_rotated: bool,
}

/// OIDC relying party service
///
/// Holds the immutable provider description and client registration; all
/// per-user state lives in the [`SessionState`] passed to each operation.
pub struct AuthService {
    provider: Arc<ProviderMetadata>,
    client_id: String,
    redirect_uri: String,
    scope: String,
    token_endpoint: Arc<dyn TokenEndpoint>,
    end_session: Arc<dyn EndSessionEndpoint>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Create a new service for one client registration.
    pub fn new(
        provider: Arc<ProviderMetadata>,
        config: &RelyingPartyConfig,
        token_endpoint: Arc<dyn TokenEndpoint>,
        end_session: Arc<dyn EndSessionEndpoint>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.to_string(),
            scope: config.scope_string(),
            token_endpoint,
            end_session,
            clock,
        }
    }

    #[must_use]
    pub fn provider(&self) -> &ProviderMetadata {
        &self.provider
    }

    /// Start a login.
    ///
    /// Stores a fresh state/nonce pair in the session, replacing any earlier
    /// attempt, and describes where to send the browser. No network call.
    pub fn begin_login(&self, session: &mut SessionState) -> AuthorizationRequest {
        let attempt = new_login_attempt();

        let request = AuthorizationRequest {
            endpoint: self.provider.authorization_endpoint.clone(),
            response_type: RESPONSE_TYPE_CODE.to_string(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
            state: attempt.state.clone(),
            nonce: attempt.nonce.clone(),
        };

        let replaced = session.login_attempt().is_some();
        session.put_login_attempt(attempt);
        debug!(replaced_attempt = replaced, "Login attempt stored");

        request
    }

    /// Handle the authorization callback.
    ///
    /// # Errors
    /// - `CsrfMismatch` when no attempt is pending or `received_state`
    ///   differs from it; the session is left untouched.
    /// - `TokenExchangeFailed` or `IdTokenInvalid`; the session is reset to
    ///   anonymous and any tokens obtained are discarded.
    pub async fn complete_login(
        &self,
        session: &mut SessionState,
        received_state: &str,
        authorization_code: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let Some(attempt) = session.login_attempt().cloned() else {
            warn!("Callback received without a pending login attempt");
            return Err(AuthError::CsrfMismatch);
        };
        if !validate_state(&attempt.state, received_state) {
            warn!("Callback state does not match pending login attempt");
            return Err(AuthError::CsrfMismatch);
        }

        let exchanged = self.token_endpoint.exchange_code(authorization_code).await;
        let now = self.clock.now();
        let tokens = match exchanged.and_then(|response| accept(response, now)) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "Authorization code exchange failed");
                session.clear();
                return Err(err.into());
            }
        };

        let claims = match self.verify(&tokens.id_token, Some(&attempt.nonce), now) {
            Ok(claims) => claims,
            Err(err) => {
                session.clear();
                return Err(err);
            }
        };

        let expires_at = tokens.expires_at;
        session.put_tokens(tokens);

        info!(
            subject = %claims.subject,
            expires_at = %expires_at,
            id_token_expires_at = ?claims.expires_at(),
            "Login completed"
        );
        Ok(LoginOutcome { expires_at, claims })
    }

    /// Exchange the held refresh token for a new token set.
    ///
    /// # Errors
    /// - `NoRefreshToken` when the session holds no tokens or no refresh
    ///   token.
    /// - `TokenExchangeFailed` or `IdTokenInvalid`; the held tokens are left
    ///   untouched.
    pub async fn refresh(&self, session: &mut SessionState) -> Result<RefreshOutcome, AuthError> {
        let Some(refresh_token) = session.tokens().and_then(|t| t.refresh_token.clone()) else {
            return Err(AuthError::NoRefreshToken);
        };

        let exchanged = self.token_endpoint.exchange_refresh_token(&refresh_token).await;
        let now = self.clock.now();
        let next = exchanged.and_then(|response| accept(response, now)).map_err(|err| {
            warn!(error = %err, status = ?err.status(), "Refresh token exchange failed");
            AuthError::from(err)
        })?;

        let claims = self.verify(&next.id_token, None, now)?;

        let refresh_token_rotated = next.refresh_token.is_some();
        let Some(current) = session.tokens() else {
            return Err(AuthError::NoRefreshToken);
        };
        let rotated = current.rotated(next);
        let expires_at = rotated.expires_at;
        session.replace_tokens(rotated);

        info!(
            subject = %claims.subject,
            expires_at = %expires_at,
            refresh_token_rotated,
            "Tokens refreshed"
        );
        Ok(RefreshOutcome { expires_at, claims, refresh_token_rotated })
    }

    /// RP-initiated logout.
    ///
    /// The session is cleared only when the provider acknowledges with 200
    /// or 302.
    ///
    /// # Errors
    /// - `NoActiveSession` when the session holds no tokens.
    /// - `LogoutFailed` for any other status or a transport failure; the
    ///   session is left untouched.
    pub async fn logout(&self, session: &mut SessionState) -> Result<(), AuthError> {
        let Some(tokens) = session.tokens() else {
            return Err(AuthError::NoActiveSession);
        };

        let request = EndSessionRequest {
            endpoint: self.provider.end_session_endpoint.clone(),
            id_token_hint: tokens.id_token.clone(),
        };

        match self.end_session.end_session(&request).await {
            Ok(200 | 302) => {
                session.clear();
                info!("Logged out");
                Ok(())
            }
            Ok(status) => {
                warn!(status, "End-session endpoint did not acknowledge logout");
                Err(AuthError::LogoutFailed {
                    status: Some(status),
                    message: format!("end-session endpoint returned {status}"),
                })
            }
            Err(message) => {
                warn!(error = %message, "End-session request failed");
                Err(AuthError::LogoutFailed { status: None, message })
            }
        }
    }

    /// Drop a pending login attempt, e.g. after the provider reported an
    /// authorization error. Held tokens are kept.
    pub fn abandon_login(&self, session: &mut SessionState) -> bool {
        session.take_login_attempt().is_some()
    }

    fn verify(
        &self,
        id_token: &str,
        nonce: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<IdTokenClaims, AuthError> {
        let expected =
            Expectations { issuer: &self.provider.issuer, audience: &self.client_id, nonce };
        verify_id_token(id_token, &expected, &self.provider.signing_keys, now).map_err(
            |err| {
                warn!(error = %err, "ID token rejected");
                AuthError::from(err)
            },
        )
    }
}

/// Turn a token endpoint reply into a token set anchored at `now`.
///
/// Port implementations only return replies with a 2xx status, so a reply
/// rejected here is reported as a malformed 200.
fn accept(response: TokenResponse, now: DateTime<Utc>) -> Result<TokenSet, ExchangeError> {
    response
        .into_token_set(now)
        .map_err(|reason| ExchangeError::MalformedBody {
            status: 200,
            reason,
            body: String::new(),
        })
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.provider.issuer)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
