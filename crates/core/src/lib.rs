//! # OIDC RP Core
//!
//! Authentication state machine for the relying party, free of HTTP and
//! storage code.
//!
//! This crate contains:
//! - The four operations (begin login, complete login, refresh, logout) in
//!   [`AuthService`]
//! - ID Token verification
//! - Per-session login attempt and token storage ([`SessionState`])
//! - Port interfaces for the token endpoint, end-session endpoint, session
//!   store and clock
//!
//! ## Architecture Principles
//! - Only depends on `oidc-rp-domain`
//! - Provider calls go through traits implemented in `oidc-rp-infra`
//! - Session writes happen only once every provider call has returned

pub mod auth;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::ports::{
    Clock, EndSessionEndpoint, SessionStore, SharedSession, SystemClock, TokenEndpoint,
};
pub use auth::service::{AuthService, LoginOutcome, RefreshOutcome};
pub use auth::session::{AuthState, SessionState};
pub use auth::verifier::{verify_id_token, Expectations};
