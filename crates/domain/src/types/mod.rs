//! Domain types and models
//!
//! - [`provider`]: discovered provider description and signing keys
//! - [`tokens`]: token endpoint responses and the per-session token triple
//! - [`claims`]: decoded ID Token claims
//! - [`requests`]: authorization and end-session request descriptions

pub mod claims;
pub mod provider;
pub mod requests;
pub mod tokens;

pub use claims::{Audience, IdTokenClaims};
pub use provider::ProviderMetadata;
pub use requests::{AuthorizationRequest, EndSessionRequest, LoginAttempt};
pub use tokens::{TokenResponse, TokenSet};
