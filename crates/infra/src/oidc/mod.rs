//! Adapters for the identity provider's endpoints

pub mod discovery;
pub mod end_session;
pub mod token_client;

pub use discovery::discover;
pub use end_session::HttpEndSessionClient;
pub use token_client::HttpTokenClient;
