use tracing::{debug, warn};
use url::Url;

use crate::Result;
use crate::config::Config;
use crate::token::{Token, TokenResponse, unix_now};

/// Blocking OAuth client for the bank's token endpoint
///
/// Handles the two grants the provider supports: exchanging a BankID
/// authorization code for a token, and trading a refresh token for a
/// fresh one.
pub struct OAuthClient {
    config: Config,
    http: reqwest::blocking::Client,
}

/// A grant the token endpoint accepts
///
/// The provider knows exactly two; anything else is unrepresentable.
pub enum Grant<'a> {
    /// Authorization code obtained through BankID authentication,
    /// together with the `state` generated for the pending request
    AuthorizationCode { code: &'a str, state: &'a str },
    /// Previously stored refresh token
    RefreshToken { refresh_token: &'a str },
}

impl Grant<'_> {
    /// Form fields specific to this grant, sent on top of the client
    /// credentials
    fn params(&self, config: &Config) -> Vec<(&'static str, String)> {
        match self {
            Grant::AuthorizationCode { code, state } => vec![
                ("grant_type", "authorization_code".to_string()),
                ("code", (*code).to_string()),
                ("state", (*state).to_string()),
                ("redirect_uri", config.redirect_uri.clone()),
            ],
            Grant::RefreshToken { refresh_token } => vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", (*refresh_token).to_string()),
            ],
        }
    }
}

impl OAuthClient {
    /// Create a client for the configured provider endpoints
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Build the authorization URL the user's browser must visit
    ///
    /// Carries the client ID, the generated `state`, the redirect URI,
    /// the financial-institution hint when one is configured, and
    /// `response_type=code`.
    pub fn authorization_url(&self, state: &str) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.config.client_id)
                .append_pair("state", state)
                .append_pair("redirect_uri", &self.config.redirect_uri);
            if !self.config.fin_inst.is_empty() {
                pairs.append_pair("finInst", &self.config.fin_inst);
            }
            pairs.append_pair("response_type", "code");
        }
        Ok(url.into())
    }

    /// Run a form-encoded exchange against the token endpoint
    ///
    /// A rejected exchange (non-2xx) is an absence, not an error: the
    /// caller decides whether to fall back to a full authentication.
    /// Transport failures still surface as errors. The returned token's
    /// `issued_at` is stamped to the current time.
    pub fn exchange(&self, grant: Grant<'_>) -> Result<Option<Token>> {
        let mut params = vec![
            ("client_id", self.config.client_id.clone()),
            ("client_secret", self.config.client_secret.clone()),
        ];
        params.extend(grant.params(&self.config));

        debug!(url = %self.config.token_url, "token exchange");
        let response = self.http.post(&self.config.token_url).form(&params).send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            warn!(status, %body, "token exchange rejected");
            return Ok(None);
        }

        let token_response: TokenResponse = response.json()?;
        Ok(Some(Token::from_response(token_response, unix_now())))
    }

    /// Exchange a BankID authorization code for a token
    pub fn exchange_code(&self, code: &str, state: &str) -> Result<Option<Token>> {
        self.exchange(Grant::AuthorizationCode { code, state })
    }

    /// Trade the stored refresh token for a fresh token
    pub fn refresh(&self, refresh_token: &str) -> Result<Option<Token>> {
        self.exchange(Grant::RefreshToken { refresh_token })
    }
}
