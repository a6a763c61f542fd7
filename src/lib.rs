//! # sb1-balance
//!
//! SpareBank 1 account balances from the command line.
//!
//! Authenticates against the bank's OAuth 2.0 / BankID flow, keeps the
//! resulting token in a local JSON file, and prints one line per
//! account. The interesting part is the token lifecycle: obtain,
//! persist, check expiry, then refresh or re-authenticate before use.
//!
//! ## Flow
//!
//! - No stored token, or an expired refresh token → full browser
//!   authentication: a one-shot local listener captures the BankID
//!   redirect and the authorization code is exchanged for a token.
//! - Expired access token with a live refresh token → refresh-token
//!   exchange, falling back to browser authentication when the
//!   provider rejects it.
//! - Valid access token → used as-is, no network call.
//!
//! Whatever the path, the resolved token is written back to the store
//! in full before use.
//!
//! ## Quick start
//!
//! ```no_run
//! use sb1_balance::{AuthFlow, Config, OAuthClient, TokenStore, DEFAULT_TOKEN_PATH};
//!
//! fn main() -> sb1_balance::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = OAuthClient::new(config.clone());
//!     let store = TokenStore::new(DEFAULT_TOKEN_PATH);
//!
//!     let token = AuthFlow::new(&config, &client, &store).authenticate()?;
//!     let accounts = sb1_balance::fetch_accounts(&config, &token)?;
//!     sb1_balance::print_report(&accounts);
//!     Ok(())
//! }
//! ```

mod accounts;
mod browser;
mod client;
mod config;
mod error;
mod flow;
mod server;
mod store;
mod token;

// Public API exports
pub use accounts::{Account, fetch_accounts, format_account, print_report};
pub use browser::open_browser;
pub use client::{Grant, OAuthClient};
pub use config::Config;
pub use error::{Result, Sb1Error};
pub use flow::{AuthFlow, Decision, decide};
pub use server::{Callback, CallbackServer};
pub use store::{DEFAULT_TOKEN_PATH, TokenStore};
pub use token::Token;
