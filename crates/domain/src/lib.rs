//! # OIDC RP Domain
//!
//! Domain types for the OpenID Connect relying party.
//!
//! This crate contains:
//! - Provider metadata, token sets and ID Token claims
//! - Authentication and startup error types
//! - Relying party configuration
//! - Protocol constants
//!
//! ## Architecture
//! - No dependencies on other oidc-rp crates
//! - Pure data and validation, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
