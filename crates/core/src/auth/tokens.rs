//! Opaque random values for CSRF protection and replay prevention
//!
//! `state`, `nonce` and session identifiers are all 256 bits from the
//! thread-local CSPRNG, rendered as unpadded base64url.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use oidc_rp_domain::constants::RANDOM_TOKEN_BYTES;
use oidc_rp_domain::LoginAttempt;
use rand::Rng;

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a random state token for CSRF protection
#[must_use]
pub fn generate_state() -> String {
    random_token()
}

/// Generate a random nonce binding the ID Token to this login attempt
#[must_use]
pub fn generate_nonce() -> String {
    random_token()
}

/// Generate an opaque session identifier for the boundary's cookie
#[must_use]
pub fn generate_session_id() -> String {
    random_token()
}

/// Fresh state/nonce pair for one login attempt
#[must_use]
pub fn new_login_attempt() -> LoginAttempt {
    LoginAttempt { state: generate_state(), nonce: generate_nonce() }
}

/// Validate that the state token matches
///
/// Compares in constant time with respect to the contents so the callback
/// does not leak how much of a guessed state was right.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (expected, actual) = (expected.as_bytes(), actual.as_bytes());
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::tokens.
    use std::collections::HashSet;

    use super::*;

    /// Validates `generate_state` behavior for the entropy and encoding
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms 32 random bytes encode to 43 characters.
    /// - Ensures no padding or non-URL-safe characters are present.
    #[test]
    fn test_state_is_unpadded_base64url() {
        let state = generate_state();

        assert_eq!(state.len(), 43);
        assert!(!state.contains('='));
        assert!(!state.contains('+'));
        assert!(!state.contains('/'));
        assert_eq!(URL_SAFE_NO_PAD.decode(&state).unwrap().len(), RANDOM_TOKEN_BYTES);
    }

    /// Validates `new_login_attempt` behavior for the unique attempts
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms no state, nonce or session id repeats across a few
    ///   thousand draws, including across kinds.
    /// - Confirms every nonce decodes to at least 128 bits.
    #[test]
    fn test_unique_login_attempts() {
        const SAMPLES: usize = 5_000;
        let mut seen = HashSet::with_capacity(SAMPLES * 3);

        for _ in 0..SAMPLES {
            let attempt = new_login_attempt();
            assert!(URL_SAFE_NO_PAD.decode(&attempt.nonce).unwrap().len() * 8 >= 128);
            assert!(URL_SAFE_NO_PAD.decode(&attempt.state).unwrap().len() * 8 >= 128);

            assert!(seen.insert(attempt.state), "state collided");
            assert!(seen.insert(attempt.nonce), "nonce collided");
            assert!(seen.insert(generate_session_id()), "session id collided");
        }

        assert_eq!(seen.len(), SAMPLES * 3);
    }

    /// Validates `validate_state` behavior for the exact match scenario.
    ///
    /// Assertions:
    /// - Ensures identical values match.
    /// - Ensures a single changed character, a prefix and an empty value
    ///   are rejected.
    #[test]
    fn test_validate_state_requires_exact_match() {
        let state = generate_state();

        assert!(validate_state(&state, &state.clone()));

        let mut tampered = state.clone().into_bytes();
        tampered[0] = if tampered[0] == b'A' { b'B' } else { b'A' };
        assert!(!validate_state(&state, &String::from_utf8(tampered).unwrap()));
        assert!(!validate_state(&state, &state[..42]));
        assert!(!validate_state(&state, ""));
    }
}
