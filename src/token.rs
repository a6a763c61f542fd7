use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// OAuth token pair plus the metadata needed for expiry checks
///
/// This is the only persistent entity: it is written to the token store
/// verbatim after every successful exchange and overwritten wholesale on
/// every refresh or re-authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The access token used to authenticate API requests
    pub access_token: String,
    /// The refresh token used to obtain new access tokens
    pub refresh_token: String,
    /// Access-token lifetime in seconds, relative to `issued_at`
    pub expires_in: u64,
    /// Refresh-token lifetime in seconds, relative to `issued_at`
    pub refresh_token_expires_in: u64,
    /// Unix timestamp (seconds) stamped locally when the token response
    /// was received; never taken from the provider
    pub issued_at: u64,
}

impl Token {
    /// Stamp a provider response into a `Token` issued at `now`
    pub(crate) fn from_response(response: TokenResponse, now: u64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            refresh_token_expires_in: response.refresh_token_expires_in,
            issued_at: now,
        }
    }

    /// True while the access token can still authorize API calls
    pub fn access_valid(&self, now: u64) -> bool {
        now < self.issued_at.saturating_add(self.expires_in)
    }

    /// True while the refresh token can still be exchanged for a new
    /// access token
    pub fn refresh_valid(&self, now: u64) -> bool {
        now < self.issued_at.saturating_add(self.refresh_token_expires_in)
    }
}

/// Token response from the OAuth server
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub refresh_token_expires_in: u64,
}

/// Current unix time in seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Generate a random state string for CSRF protection
pub(crate) fn generate_state() -> String {
    use base64::{Engine as _, engine::general_purpose};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(issued_at: u64, expires_in: u64, refresh_expires_in: u64) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in,
            refresh_token_expires_in: refresh_expires_in,
            issued_at,
        }
    }

    #[test]
    fn access_validity_boundary() {
        let t = token(0, 100, 100_000);
        assert!(t.access_valid(0));
        assert!(t.access_valid(99));
        // expiry instant itself is no longer valid
        assert!(!t.access_valid(100));
        assert!(!t.access_valid(150));
    }

    #[test]
    fn refresh_validity_boundary() {
        let t = token(0, 100, 100_000);
        assert!(t.refresh_valid(0));
        assert!(t.refresh_valid(99_999));
        assert!(!t.refresh_valid(100_000));
    }

    #[test]
    fn validity_is_monotonic_in_now() {
        let t = token(1_000, 100, 1_000);
        let mut was_valid = true;
        for now in 0..3_000 {
            let valid = t.access_valid(now);
            assert!(!(valid && !was_valid), "validity regained at now={now}");
            was_valid = valid;
        }
    }

    #[test]
    fn predicates_are_independent() {
        // access expired, refresh still valid
        let t = token(0, 100, 100_000);
        assert!(!t.access_valid(150));
        assert!(t.refresh_valid(150));

        // refresh expired while access (oddly) still valid
        let t = token(0, 100_000, 100);
        assert!(t.access_valid(150));
        assert!(!t.refresh_valid(150));
    }

    #[test]
    fn from_response_stamps_issued_at_locally() {
        let response = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 600,
            refresh_token_expires_in: 3_600,
        };

        let t = Token::from_response(response, 1_234);
        assert_eq!(t.issued_at, 1_234);
        assert_eq!(t.access_token, "a");
        assert_eq!(t.refresh_token, "r");
        assert_eq!(t.expires_in, 600);
        assert_eq!(t.refresh_token_expires_in, 3_600);
    }

    #[test]
    fn validity_does_not_overflow_on_huge_lifetimes() {
        let t = token(u64::MAX - 10, u64::MAX, u64::MAX);
        assert!(t.access_valid(u64::MAX - 1));
    }

    #[test]
    fn generated_states_are_distinct_and_url_safe() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
