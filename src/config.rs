use std::time::Duration;

use crate::{Result, Sb1Error};

const AUTH_URL: &str = "https://api.sparebank1.no/oauth/authorize";
const TOKEN_URL: &str = "https://api.sparebank1.no/oauth/token";
const ACCOUNTS_URL: &str = "https://api.sparebank1.no/personal/banking/accounts";

/// Configuration for the balance tool
///
/// All credentials and the redirect listener address come from the
/// environment; the process fails fast at startup when a required
/// variable is absent. Endpoint URLs are plain fields so tests never
/// have to reach the production host.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host the local redirect listener binds to (`SB1_HOST`)
    pub listen_host: String,
    /// Port the local redirect listener binds to (`SB1_PORT`)
    pub listen_port: u16,
    /// OAuth client ID (`SB1_CLIENT_ID`)
    pub client_id: String,
    /// OAuth client secret (`SB1_CLIENT_SECRET`)
    pub client_secret: String,
    /// Financial-institution hint for the authorize endpoint
    /// (`SB1_FIN_INST`); empty leaves the hint out of the URL
    pub fin_inst: String,
    /// Redirect URI registered with the provider (`SB1_REDIRECT_URI`)
    pub redirect_uri: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token exchange endpoint URL
    pub token_url: String,
    /// Accounts listing endpoint URL
    pub accounts_url: String,
    /// How long the redirect listener waits for the browser callback
    /// (`SB1_CALLBACK_TIMEOUT_SECS`); `None` waits forever
    pub callback_timeout: Option<Duration>,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_port = required(&get, "SB1_PORT")?
            .parse::<u16>()
            .map_err(|e| Sb1Error::InvalidConfig(format!("SB1_PORT: {e}")))?;

        let callback_timeout = match get("SB1_CALLBACK_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    Sb1Error::InvalidConfig(format!("SB1_CALLBACK_TIMEOUT_SECS: {e}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            listen_host: required(&get, "SB1_HOST")?,
            listen_port,
            client_id: required(&get, "SB1_CLIENT_ID")?,
            client_secret: required(&get, "SB1_CLIENT_SECRET")?,
            fin_inst: required(&get, "SB1_FIN_INST")?,
            redirect_uri: required(&get, "SB1_REDIRECT_URI")?,
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            accounts_url: ACCOUNTS_URL.to_string(),
            callback_timeout,
        })
    }
}

fn required(get: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String> {
    get(name).ok_or(Sb1Error::MissingConfig(name))
}
