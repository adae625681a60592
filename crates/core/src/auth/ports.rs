//! Port interfaces for the authentication flow
//!
//! These traits define the boundaries between the state machine and the
//! provider-facing HTTP adapters, session storage and wall clock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oidc_rp_domain::{EndSessionRequest, ExchangeError, TokenResponse};
use tokio::sync::Mutex;

use super::session::SessionState;

/// Trait for the provider's token endpoint
///
/// Implementations perform exactly one request per call. A returned
/// [`TokenResponse`] has already passed strict decoding and
/// [`TokenResponse::validate`].
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Authorization-code grant.
    ///
    /// # Errors
    /// Returns `ExchangeError` on transport failure, non-2xx status or a
    /// malformed body.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ExchangeError>;

    /// Refresh-token grant.
    ///
    /// # Errors
    /// Same conditions as [`TokenEndpoint::exchange_code`].
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, ExchangeError>;
}

/// Trait for the provider's end-session endpoint
#[async_trait]
pub trait EndSessionEndpoint: Send + Sync {
    /// Issue the logout request and report the raw HTTP status.
    ///
    /// Redirects must not be followed; a `302` is a valid acknowledgment.
    ///
    /// # Errors
    /// Returns a message when no HTTP response was received at all.
    async fn end_session(&self, request: &EndSessionRequest) -> Result<u16, String>;
}

/// A single user's session, locked for the duration of one operation.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Trait for the boundary's session storage
///
/// Sessions are keyed by an opaque identifier the boundary hands out.
/// Different sessions may be used concurrently; operations on the same
/// session serialise on its mutex.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session, creating an empty one when absent.
    async fn get_or_create(&self, session_id: &str) -> SharedSession;

    /// Fetch a session without creating it.
    async fn get(&self, session_id: &str) -> Option<SharedSession>;

    /// Store `state` under `session_id`, replacing any session already there.
    async fn insert(&self, session_id: &str, state: SessionState) -> SharedSession;

    async fn remove(&self, session_id: &str);

    /// Drop sessions untouched for longer than `max_idle`, returning how many
    /// were removed.
    async fn purge_idle(&self, max_idle: Duration) -> usize;
}

/// Wall clock used for token expiry and ID Token `exp` checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
