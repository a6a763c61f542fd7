use std::time::Duration;

use tiny_http::{Header, Response, Server};
use tracing::debug;
use url::Url;

use crate::{Result, Sb1Error};

/// Static page shown in the browser once the redirect has been captured
const CONFIRMATION_PAGE: &str = r#"<!DOCTYPE html>
<html>
    <head><title>Authentication complete</title></head>
    <body>
        <h1>Authentication complete</h1>
        <p>You can close this window and return to the terminal.</p>
    </body>
</html>
"#;

/// Query parameters delivered by the provider's browser redirect
#[derive(Debug)]
pub struct Callback {
    pub code: String,
    pub state: String,
}

/// One-shot local HTTP listener for the OAuth browser redirect
///
/// Bind before opening the browser so the redirect cannot race the
/// listener. `wait` serves exactly one request and the listener shuts
/// down when the server is dropped.
pub struct CallbackServer {
    server: Server,
}

impl CallbackServer {
    /// Bind the listener to the configured host and port
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let server = Server::http(&addr)
            .map_err(|e| Sb1Error::CallbackServer(format!("failed to bind to {addr}: {e}")))?;
        Ok(Self { server })
    }

    /// Block until the single browser redirect arrives, then answer it
    ///
    /// The redirect must carry `code` and `state` query parameters;
    /// anything else is a fatal error. With a timeout configured, an
    /// expired wait is fatal too.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Callback> {
        let request = match timeout {
            Some(limit) => self.server.recv_timeout(limit)?.ok_or_else(|| {
                Sb1Error::CallbackServer(format!(
                    "no redirect received within {}s",
                    limit.as_secs()
                ))
            })?,
            None => self.server.recv()?,
        };

        debug!(url = request.url(), "redirect received");
        let callback = parse_redirect(request.url())?;

        let header = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
            .expect("static header");
        request.respond(Response::from_string(CONFIRMATION_PAGE).with_header(header))?;

        Ok(callback)
    }
}

/// Extract `code` and `state` from the redirect's query string
fn parse_redirect(path: &str) -> Result<Callback> {
    let url = Url::parse(&format!("http://localhost{path}"))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, state) {
        (Some(code), Some(state)) => Ok(Callback { code, state }),
        (None, _) => Err(Sb1Error::MalformedRedirect(
            "missing code parameter".to_string(),
        )),
        (_, None) => Err(Sb1Error::MalformedRedirect(
            "missing state parameter".to_string(),
        )),
    }
}
