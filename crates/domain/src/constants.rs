//! Protocol and deployment constants

// OpenID Connect
pub const OPENID_SCOPE: &str = "openid";
pub const RESPONSE_TYPE_CODE: &str = "code";
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";
pub const DISCOVERY_PATH: &str = ".well-known/openid-configuration";

// Defaults
pub const DEFAULT_SCOPES: &[&str] = &["email", "profile", "offline_access"];
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:4567";
pub const DEFAULT_SESSION_IDLE_SECONDS: u64 = 3600;

/// Longest access token lifetime accepted from a token endpoint (one year).
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 60 * 60 * 24 * 365;

/// Random bytes behind every state, nonce and session id.
pub const RANDOM_TOKEN_BYTES: usize = 32;

pub const SESSION_COOKIE_NAME: &str = "rp_session";
