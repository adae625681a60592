//! Testing utilities and helpers
//!
//! Available to this crate's unit tests and, behind the `test-utils`
//! feature, to the infra and server crates:
//! - **[`fixtures`]**: RSA signing keys, ID Token signing, provider metadata
//!   and configuration fixtures
//! - **[`mocks`]**: in-memory [`TokenEndpoint`](crate::TokenEndpoint) and
//!   [`EndSessionEndpoint`](crate::EndSessionEndpoint) implementations
//! - **[`time`]**: a settable [`Clock`](crate::Clock)

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

pub mod fixtures;
pub mod mocks;
pub mod time;

pub use fixtures::{
    claims_for, sign_id_token, sign_id_token_with_kid, sign_id_token_without_kid,
    sign_with_foreign_key, test_config, test_jwks, test_jwks_json, test_provider, token_response,
    TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_ISSUER, TEST_KID, TEST_REDIRECT_URI,
};
pub use mocks::{MockEndSession, MockTokenEndpoint};
pub use time::FixedClock;
