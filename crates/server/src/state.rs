//! Shared application state and startup wiring

use std::sync::Arc;
use std::time::Duration;

use oidc_rp_core::{AuthService, SessionStore, SystemClock};
use oidc_rp_domain::{RelyingPartyConfig, Result};
use oidc_rp_infra::{
    discover, HttpClientBuilder, HttpEndSessionClient, HttpTokenClient, InMemorySessionStore,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

const DISCOVERY_ATTEMPTS: usize = 3;
const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// State handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuthService>,
    pub sessions: Arc<dyn SessionStore>,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        service: Arc<AuthService>,
        sessions: Arc<dyn SessionStore>,
        secure_cookies: bool,
    ) -> Self {
        Self { service, sessions, secure_cookies }
    }

    /// Discover the provider and wire the HTTP adapters.
    ///
    /// # Errors
    /// Returns the discovery or HTTP client error; the process should not
    /// start without a provider description.
    pub async fn bootstrap(config: &RelyingPartyConfig) -> Result<Self> {
        let discovery_http =
            HttpClientBuilder::from_config(config).max_attempts(DISCOVERY_ATTEMPTS).build()?;
        let provider = discover(&config.issuer_url, &discovery_http).await?;

        let http = HttpClientBuilder::from_config(config).follow_redirects(false).build()?;
        let token_client = HttpTokenClient::new(http.clone(), &provider, config);
        let end_session = HttpEndSessionClient::new(http);

        let service = AuthService::new(
            Arc::new(provider),
            config,
            Arc::new(token_client),
            Arc::new(end_session),
            Arc::new(SystemClock),
        );

        Ok(Self::new(
            Arc::new(service),
            Arc::new(InMemorySessionStore::new()),
            config.secure_cookies,
        ))
    }
}

/// Periodically drop sessions idle for longer than `max_idle`.
pub fn spawn_session_reaper(sessions: Arc<dyn SessionStore>, max_idle: Duration) -> JoinHandle<()> {
    let period = REAP_INTERVAL.min(max_idle).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_idle(max_idle).await;
            if purged > 0 {
                info!(purged, "Idle sessions purged");
            }
        }
    })
}
