//! # OIDC RP Server
//!
//! axum boundary for the relying party: maps browser requests onto
//! [`oidc_rp_core::AuthService`] operations and carries the session cookie.
//!
//! Routes:
//! - `GET /login` redirects to the provider's authorization endpoint
//! - `GET /login_callback` completes the login
//! - `GET /refresh` refreshes the held tokens
//! - `GET /logout` ends the session at the provider
//! - `GET /healthz` liveness probe

pub mod cookies;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::router;
pub use state::{spawn_session_reaper, AppState};
