//! Tracing subscriber setup for the binary

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,oidc_rp=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter; `RP_LOG_FORMAT=json` switches to
/// JSON lines.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("RP_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_current_span(false)))
        .with((!json).then(|| fmt::layer().with_target(true)))
        .try_init()
}
