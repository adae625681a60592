//! Authorization Code flow against a single identity provider

pub mod ports;
pub mod service;
pub mod session;
pub mod tokens;
pub mod verifier;
