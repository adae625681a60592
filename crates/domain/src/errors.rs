//! Error types used throughout the relying party
//!
//! Two families live here:
//! - [`AuthError`] and its payloads ([`VerificationError`], [`ExchangeError`])
//!   are the terminal outcomes of the four authentication operations and are
//!   surfaced verbatim to the HTTP boundary.
//! - [`RelyingPartyError`] covers startup and infrastructure concerns
//!   (configuration, discovery, transport setup).

use thiserror::Error;

/// Reasons an ID Token was rejected, in the order the checks run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Not a three-part signed token, or header/claims failed to decode.
    #[error("malformed ID token: {0}")]
    Malformed(String),

    /// No provider signing key validates the signature.
    #[error("ID token signature does not match any provider signing key")]
    BadSignature,

    #[error("ID token issuer mismatch: expected {expected}, found {found}")]
    IssuerMismatch { expected: String, found: String },

    #[error("ID token audience {found:?} does not contain {expected}")]
    AudienceMismatch { expected: String, found: Vec<String> },

    #[error("ID token expired at {expired_at}")]
    Expired { expired_at: i64 },

    #[error("ID token nonce does not match the login attempt")]
    NonceMismatch,
}

/// Failure talking to the provider's token endpoint.
///
/// Carries the upstream status and body so the boundary can log what the
/// provider actually said.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("token endpoint request failed: {0}")]
    Request(String),

    /// The provider answered with a non-2xx status.
    #[error("token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered 2xx but the body is not a valid token response.
    ///
    /// `body` is the raw reply as received, for diagnostics, or empty when
    /// the reply was rejected after the adapter handed it over. It may
    /// contain tokens and is left out of the `Display` output.
    #[error("token endpoint returned malformed body ({status}): {reason}")]
    MalformedBody { status: u16, reason: String, body: String },
}

impl ExchangeError {
    /// Upstream HTTP status, when the provider answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(_) => None,
            Self::Status { status, .. } | Self::MalformedBody { status, .. } => Some(*status),
        }
    }
}

/// Terminal failure of an authentication operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Callback `state` is missing from the session or does not match.
    #[error("state parameter does not match the pending login")]
    CsrfMismatch,

    #[error("ID token rejected: {0}")]
    IdTokenInvalid(#[from] VerificationError),

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(#[from] ExchangeError),

    #[error("no refresh token available")]
    NoRefreshToken,

    #[error("no active session")]
    NoActiveSession,

    /// The provider did not acknowledge the end-session request.
    #[error("logout failed: {message}")]
    LogoutFailed { status: Option<u16>, message: String },
}

impl AuthError {
    /// Stable label suitable for structured log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CsrfMismatch => "csrf_mismatch",
            Self::IdTokenInvalid(inner) => match inner {
                VerificationError::Malformed(_) => "id_token_malformed",
                VerificationError::BadSignature => "id_token_bad_signature",
                VerificationError::IssuerMismatch { .. } => "id_token_issuer_mismatch",
                VerificationError::AudienceMismatch { .. } => "id_token_audience_mismatch",
                VerificationError::Expired { .. } => "id_token_expired",
                VerificationError::NonceMismatch => "id_token_nonce_mismatch",
            },
            Self::TokenExchangeFailed(_) => "token_exchange_failed",
            Self::NoRefreshToken => "no_refresh_token",
            Self::NoActiveSession => "no_active_session",
            Self::LogoutFailed { .. } => "logout_failed",
        }
    }
}

/// Startup and infrastructure errors.
#[derive(Error, Debug)]
pub enum RelyingPartyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for startup and infrastructure operations
pub type Result<T> = std::result::Result<T, RelyingPartyError>;
