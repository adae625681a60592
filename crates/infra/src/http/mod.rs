//! HTTP transport towards the identity provider

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
