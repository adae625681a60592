//! Mock implementations of the provider-facing ports
//!
//! Responses are queued per grant and handed out in order; calls are
//! counted so tests can assert the provider was (or was not) contacted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oidc_rp_domain::{EndSessionRequest, ExchangeError, TokenResponse};

use crate::auth::ports::{EndSessionEndpoint, TokenEndpoint};

type Queued = Arc<Mutex<VecDeque<Result<TokenResponse, ExchangeError>>>>;

/// Mock token endpoint that replays queued responses without network calls.
#[derive(Clone, Debug, Default)]
pub struct MockTokenEndpoint {
    code_responses: Queued,
    refresh_responses: Queued,
    codes: Arc<Mutex<Vec<String>>>,
    refresh_tokens: Arc<Mutex<Vec<String>>>,
    stalled: Arc<AtomicBool>,
}

impl MockTokenEndpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next authorization-code grant.
    pub fn push_code_response(&self, response: Result<TokenResponse, ExchangeError>) {
        self.code_responses.lock().unwrap().push_back(response);
    }

    /// Queue the result of the next refresh-token grant.
    pub fn push_refresh_response(&self, response: Result<TokenResponse, ExchangeError>) {
        self.refresh_responses.lock().unwrap().push_back(response);
    }

    /// Leave every later exchange pending forever, like a provider that
    /// accepts the connection and never answers. Calls are still recorded.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn code_calls(&self) -> usize {
        self.codes.lock().unwrap().len()
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_tokens.lock().unwrap().len()
    }

    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.codes.lock().unwrap().last().cloned()
    }

    #[must_use]
    pub fn last_refresh_token(&self) -> Option<String> {
        self.refresh_tokens.lock().unwrap().last().cloned()
    }

    async fn next(&self, queue: &Queued) -> Result<TokenResponse, ExchangeError> {
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        queue.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ExchangeError::Status { status: 500, body: "no mock response queued".into() })
        })
    }
}

#[async_trait]
impl TokenEndpoint for MockTokenEndpoint {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ExchangeError> {
        self.codes.lock().unwrap().push(code.to_string());
        self.next(&self.code_responses).await
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, ExchangeError> {
        self.refresh_tokens.lock().unwrap().push(refresh_token.to_string());
        self.next(&self.refresh_responses).await
    }
}

/// Mock end-session endpoint answering every call with one configured result.
#[derive(Clone, Debug)]
pub struct MockEndSession {
    response: Arc<Mutex<Result<u16, String>>>,
    hints: Arc<Mutex<Vec<String>>>,
}

impl MockEndSession {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self { response: Arc::new(Mutex::new(Ok(status))), hints: Arc::default() }
    }

    pub fn set_response(&self, response: Result<u16, String>) {
        *self.response.lock().unwrap() = response;
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.hints.lock().unwrap().len()
    }

    #[must_use]
    pub fn last_hint(&self) -> Option<String> {
        self.hints.lock().unwrap().last().cloned()
    }
}

impl Default for MockEndSession {
    fn default() -> Self {
        Self::new(200)
    }
}

#[async_trait]
impl EndSessionEndpoint for MockEndSession {
    async fn end_session(&self, request: &EndSessionRequest) -> Result<u16, String> {
        self.hints.lock().unwrap().push(request.id_token_hint.clone());
        self.response.lock().unwrap().clone()
    }
}
