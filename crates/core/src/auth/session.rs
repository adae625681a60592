//! Per-session login attempt and token storage
//!
//! [`SessionState`] is the Nonce/State Vault and the Session Token Store in
//! one value. Absent entries are `None`, never a default, so callers can tell
//! a missing attempt or token set from a forged one.

use oidc_rp_domain::{LoginAttempt, TokenSet};

/// Where a session sits in the login state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    /// A login attempt is outstanding. Tokens from an earlier login may
    /// still be held until the new one completes.
    Pending,
    Authenticated,
}

/// Contents of one user's session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    login_attempt: Option<LoginAttempt>,
    tokens: Option<TokenSet>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a login attempt, replacing any earlier one.
    pub fn put_login_attempt(&mut self, attempt: LoginAttempt) {
        self.login_attempt = Some(attempt);
    }

    #[must_use]
    pub fn login_attempt(&self) -> Option<&LoginAttempt> {
        self.login_attempt.as_ref()
    }

    pub fn take_login_attempt(&mut self) -> Option<LoginAttempt> {
        self.login_attempt.take()
    }

    /// Store a token set and consume the login attempt in one step.
    pub fn put_tokens(&mut self, tokens: TokenSet) {
        self.tokens = Some(tokens);
        self.login_attempt = None;
    }

    /// Replace the held token set without touching the login attempt.
    pub fn replace_tokens(&mut self, tokens: TokenSet) {
        self.tokens = Some(tokens);
    }

    #[must_use]
    pub fn tokens(&self) -> Option<&TokenSet> {
        self.tokens.as_ref()
    }

    /// Reset to anonymous.
    pub fn clear(&mut self) {
        self.login_attempt = None;
        self.tokens = None;
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        match (&self.login_attempt, &self.tokens) {
            (Some(_), _) => AuthState::Pending,
            (None, Some(_)) => AuthState::Authenticated,
            (None, None) => AuthState::Anonymous,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn attempt(tag: &str) -> LoginAttempt {
        LoginAttempt { state: format!("state-{tag}"), nonce: format!("nonce-{tag}") }
    }

    fn tokens() -> TokenSet {
        TokenSet {
            access_token: "AT".into(),
            refresh_token: Some("RT".into()),
            id_token: "a.b.c".into(),
            expires_at: Utc::now(),
            scope: None,
        }
    }

    #[test]
    fn fresh_session_is_anonymous_and_empty() {
        let session = SessionState::new();
        assert_eq!(session.auth_state(), AuthState::Anonymous);
        assert!(session.login_attempt().is_none());
        assert!(session.tokens().is_none());
    }

    #[test]
    fn second_attempt_overwrites_first() {
        let mut session = SessionState::new();
        session.put_login_attempt(attempt("1"));
        session.put_login_attempt(attempt("2"));

        assert_eq!(session.login_attempt(), Some(&attempt("2")));
        assert_eq!(session.auth_state(), AuthState::Pending);
    }

    #[test]
    fn storing_tokens_consumes_attempt() {
        let mut session = SessionState::new();
        session.put_login_attempt(attempt("1"));
        session.put_tokens(tokens());

        assert!(session.login_attempt().is_none());
        assert_eq!(session.auth_state(), AuthState::Authenticated);
    }

    #[test]
    fn relogin_while_authenticated_is_pending() {
        let mut session = SessionState::new();
        session.put_tokens(tokens());
        session.put_login_attempt(attempt("2"));

        assert_eq!(session.auth_state(), AuthState::Pending);
        assert!(session.tokens().is_some());

        session.clear();
        assert_eq!(session.auth_state(), AuthState::Anonymous);
        assert!(session.take_login_attempt().is_none());
    }
}
