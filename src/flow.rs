use tracing::{info, warn};

use crate::browser::open_browser;
use crate::client::OAuthClient;
use crate::config::Config;
use crate::server::CallbackServer;
use crate::store::TokenStore;
use crate::token::{Token, generate_state, unix_now};
use crate::{Result, Sb1Error};

/// The next step dictated by the stored token's validity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No usable token; run the full BankID browser authentication
    FullAuth,
    /// Access token expired but the refresh token still works
    Refresh,
    /// Access token still valid; no network call needed
    UseStored,
}

/// Pick the next step from the stored token, first match wins
pub fn decide(token: Option<&Token>, now: u64) -> Decision {
    match token {
        None => Decision::FullAuth,
        Some(token) if !token.refresh_valid(now) => Decision::FullAuth,
        Some(token) if !token.access_valid(now) => Decision::Refresh,
        Some(_) => Decision::UseStored,
    }
}

/// The two ways a token can be (re)acquired
///
/// `resolve` drives the state machine against this seam; the real
/// implementation talks to the browser, the redirect listener, and the
/// token endpoint.
trait Authenticator {
    /// Full BankID browser authentication ending in an
    /// authorization-code exchange; `None` when the exchange is
    /// rejected
    fn browser_auth(&self) -> Result<Option<Token>>;

    /// Refresh-token exchange; `None` when the exchange is rejected
    fn refresh(&self, refresh_token: &str) -> Result<Option<Token>>;
}

/// Resolve the stored token into a usable one, or an absence for the
/// caller's final check
fn resolve<A: Authenticator>(auth: &A, stored: Option<Token>, now: u64) -> Result<Option<Token>> {
    match decide(stored.as_ref(), now) {
        Decision::FullAuth => {
            if stored.is_none() {
                info!("token not found, BankID authentication required");
            } else {
                info!("refresh token expired, authenticating");
            }
            auth.browser_auth()
        }
        Decision::Refresh => {
            info!("access token expired, refreshing");
            if let Some(token) = &stored {
                if let Some(refreshed) = auth.refresh(&token.refresh_token)? {
                    return Ok(Some(refreshed));
                }
            }
            warn!("failed to refresh, authenticating");
            auth.browser_auth()
        }
        Decision::UseStored => Ok(stored),
    }
}

/// Orchestrates the token store, the OAuth client, and the one-shot
/// redirect listener to produce a token that can authorize API calls
pub struct AuthFlow<'a> {
    config: &'a Config,
    client: &'a OAuthClient,
    store: &'a TokenStore,
}

impl<'a> AuthFlow<'a> {
    pub fn new(config: &'a Config, client: &'a OAuthClient, store: &'a TokenStore) -> Self {
        Self {
            config,
            client,
            store,
        }
    }

    /// Produce a valid token, refreshing or re-authenticating as needed
    ///
    /// The resolved token is written back to the store in full before
    /// being returned. A still-absent token after all recovery attempts
    /// is fatal.
    pub fn authenticate(&self) -> Result<Token> {
        let stored = self.store.load()?;
        let resolved = resolve(self, stored, unix_now())?;
        let token = resolved.ok_or(Sb1Error::AuthenticationFailed)?;
        self.store.save(&token)?;
        Ok(token)
    }
}

impl Authenticator for AuthFlow<'_> {
    fn browser_auth(&self) -> Result<Option<Token>> {
        let state = generate_state();

        // Bind before the browser opens so the redirect cannot land on
        // a closed port.
        let server = CallbackServer::bind(&self.config.listen_host, self.config.listen_port)?;
        let auth_url = self.client.authorization_url(&state)?;

        info!(url = %auth_url, "opening authorization URL in browser");
        if let Err(e) = open_browser(&auth_url) {
            warn!("could not open browser: {e}");
            eprintln!("Please visit {auth_url} to authenticate");
        }

        let callback = server.wait(self.config.callback_timeout)?;
        if callback.state != state {
            return Err(Sb1Error::StateMismatch);
        }

        self.client.exchange_code(&callback.code, &callback.state)
    }

    fn refresh(&self, refresh_token: &str) -> Result<Option<Token>> {
        self.client.refresh(refresh_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn token(issued_at: u64, expires_in: u64, refresh_expires_in: u64) -> Token {
        Token {
            access_token: "access-old".to_string(),
            refresh_token: "refresh-old".to_string(),
            expires_in,
            refresh_token_expires_in: refresh_expires_in,
            issued_at,
        }
    }

    /// Scripted authenticator that records every invocation
    struct Script {
        browser_result: Option<Token>,
        refresh_result: Option<Token>,
        browser_calls: RefCell<u32>,
        refresh_calls: RefCell<Vec<String>>,
    }

    impl Script {
        fn new(browser_result: Option<Token>, refresh_result: Option<Token>) -> Self {
            Self {
                browser_result,
                refresh_result,
                browser_calls: RefCell::new(0),
                refresh_calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Authenticator for Script {
        fn browser_auth(&self) -> Result<Option<Token>> {
            *self.browser_calls.borrow_mut() += 1;
            Ok(self.browser_result.clone())
        }

        fn refresh(&self, refresh_token: &str) -> Result<Option<Token>> {
            self.refresh_calls
                .borrow_mut()
                .push(refresh_token.to_string());
            Ok(self.refresh_result.clone())
        }
    }

    #[test]
    fn decision_covers_all_four_entry_states() {
        let t = token(0, 100, 100_000);

        assert_eq!(decide(None, 50), Decision::FullAuth);
        assert_eq!(decide(Some(&t), 200_000), Decision::FullAuth);
        assert_eq!(decide(Some(&t), 150), Decision::Refresh);
        assert_eq!(decide(Some(&t), 50), Decision::UseStored);
    }

    #[test]
    fn no_stored_token_runs_browser_auth_exactly_once() {
        let fresh = token(1_000, 600, 100_000);
        let script = Script::new(Some(fresh.clone()), None);

        let resolved = resolve(&script, None, 1_000).unwrap();

        assert_eq!(resolved, Some(fresh));
        assert_eq!(*script.browser_calls.borrow(), 1);
        assert!(script.refresh_calls.borrow().is_empty());
    }

    #[test]
    fn valid_access_token_is_used_unchanged_without_network() {
        let stored = token(0, 100, 100_000);
        let script = Script::new(None, None);

        let resolved = resolve(&script, Some(stored.clone()), 50).unwrap();

        assert_eq!(resolved, Some(stored));
        assert_eq!(*script.browser_calls.borrow(), 0);
        assert!(script.refresh_calls.borrow().is_empty());
    }

    #[test]
    fn expired_access_token_is_refreshed_with_the_stored_refresh_token() {
        let stored = token(0, 100, 100_000);
        let mut refreshed = token(150, 100, 100_000);
        refreshed.access_token = "access-new".to_string();
        let script = Script::new(None, Some(refreshed.clone()));

        let resolved = resolve(&script, Some(stored), 150).unwrap().unwrap();

        assert_eq!(*script.refresh_calls.borrow(), ["refresh-old"]);
        assert_eq!(*script.browser_calls.borrow(), 0);
        assert_eq!(resolved.issued_at, 150);
        assert_eq!(resolved, refreshed);
    }

    #[test]
    fn expired_refresh_token_forces_browser_auth() {
        let stored = token(0, 100, 100_000);
        let fresh = token(200_000, 600, 100_000);
        let script = Script::new(Some(fresh.clone()), None);

        let resolved = resolve(&script, Some(stored), 200_000).unwrap();

        assert_eq!(resolved, Some(fresh));
        assert_eq!(*script.browser_calls.borrow(), 1);
        assert!(script.refresh_calls.borrow().is_empty());
    }

    #[test]
    fn rejected_refresh_falls_back_to_browser_auth() {
        let stored = token(0, 100, 100_000);
        let fresh = token(150, 600, 100_000);
        let script = Script::new(Some(fresh.clone()), None);

        let resolved = resolve(&script, Some(stored), 150).unwrap();

        assert_eq!(script.refresh_calls.borrow().len(), 1);
        assert_eq!(*script.browser_calls.borrow(), 1);
        // the fallback's result is what flows onward
        assert_eq!(resolved, Some(fresh));
    }

    #[test]
    fn fallback_failure_surfaces_as_an_absence_for_the_final_check() {
        let stored = token(0, 100, 100_000);
        let script = Script::new(None, None);

        let resolved = resolve(&script, Some(stored), 150).unwrap();

        assert_eq!(resolved, None);
        assert_eq!(*script.browser_calls.borrow(), 1);
        assert_eq!(script.refresh_calls.borrow().len(), 1);
    }
}
