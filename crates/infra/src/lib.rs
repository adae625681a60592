//! # OIDC RP Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP client with timeout and retry support
//! - Provider discovery and JWKS retrieval
//! - Token endpoint and end-session endpoint clients
//! - In-memory session store
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `oidc-rp-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod config;
pub mod errors;
pub mod http;
pub mod oidc;
pub mod session;

pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use oidc::{discover, HttpEndSessionClient, HttpTokenClient};
pub use session::InMemorySessionStore;
