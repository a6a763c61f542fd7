use thiserror::Error;

/// Error types for SpareBank 1 authentication and account fetching
#[derive(Error, Debug)]
pub enum Sb1Error {
    #[error("missing required environment variable: {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to get token")]
    AuthenticationFailed,

    #[error("malformed redirect: {0}")]
    MalformedRedirect(String),

    #[error("state mismatch between authorization request and redirect")]
    StateMismatch,

    #[error("callback server error: {0}")]
    CallbackServer(String),

    #[error("failed to open browser: {0}")]
    BrowserLaunch(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {status}: {body}")]
    Http { status: u16, body: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SpareBank 1 operations
pub type Result<T> = std::result::Result<T, Sb1Error>;
