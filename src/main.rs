use std::process::ExitCode;

use sb1_balance::{
    AuthFlow, Config, DEFAULT_TOKEN_PATH, OAuthClient, Sb1Error, TokenStore, fetch_accounts,
    print_report,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(Sb1Error::AuthenticationFailed) => {
            error!("fatal error: failed to get token");
            ExitCode::from(1)
        }
        Err(e) => {
            error!("fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> sb1_balance::Result<()> {
    let config = Config::from_env()?;
    let client = OAuthClient::new(config.clone());
    let store = TokenStore::new(DEFAULT_TOKEN_PATH);

    let token = AuthFlow::new(&config, &client, &store).authenticate()?;

    let accounts = fetch_accounts(&config, &token)?;
    print_report(&accounts);
    Ok(())
}
