use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::token::Token;
use crate::{Result, Sb1Error};

/// Vendor-versioned media type the accounts endpoint expects
const ACCEPT: &str = "application/vnd.sparebank1.v1+json; charset=utf-8";

/// A single account as returned by the accounts-listing endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub description: String,
    pub balance: f64,
    pub currency_code: String,
}

#[derive(Debug, Deserialize)]
struct AccountList {
    accounts: Vec<Account>,
}

/// Fetch all accounts, including credit-card and ASK accounts
///
/// One authenticated GET; any HTTP or parse failure is fatal. No retry,
/// no pagination.
pub fn fetch_accounts(config: &Config, token: &Token) -> Result<Vec<Account>> {
    let mut url = Url::parse(&config.accounts_url)?;
    url.query_pairs_mut()
        .append_pair("includeCreditCardAccounts", "true")
        .append_pair("includeAskAccounts", "true");

    debug!(%url, "fetching accounts");
    let response = reqwest::blocking::Client::new()
        .get(url)
        .bearer_auth(&token.access_token)
        .header(reqwest::header::ACCEPT, ACCEPT)
        .send()?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        return Err(Sb1Error::Http { status, body });
    }

    let list: AccountList = response.json()?;
    debug!(count = list.accounts.len(), "accounts fetched");
    Ok(list.accounts)
}

/// Render one report line
///
/// Description and colon left-justified to 25 columns, balance rounded
/// to the nearest whole unit right-justified to 10, then the currency
/// code.
pub fn format_account(account: &Account) -> String {
    format!(
        "{:<25} {:>10} {}",
        format!("{}:", account.description),
        account.balance.round() as i64,
        account.currency_code
    )
}

/// Print the account report to stdout, one line per account
pub fn print_report(accounts: &[Account]) {
    for account in accounts {
        println!("{}", format_account(account));
    }
}
