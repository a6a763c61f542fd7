use crate::{Result, Sb1Error};

/// Open the authorization URL in the user's default browser
///
/// BankID authentication happens in the browser; this hands the
/// generated authorization URL to the system's default handler.
pub fn open_browser(url: &str) -> Result<()> {
    webbrowser::open(url).map_err(|e| Sb1Error::BrowserLaunch(e.to_string()))
}
