use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::token::Token;
use crate::{Result, Sb1Error};

/// Default location of the persisted token, relative to the working
/// directory
pub const DEFAULT_TOKEN_PATH: &str = "sb1-oauth.json";

/// Loads and saves the persisted token as pretty-printed JSON
///
/// The token is rewritten wholesale on every update and never deleted
/// by the program; removing the file by hand forces a fresh BankID
/// authentication.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored token; an absent file is not an error
    pub fn load(&self) -> Result<Option<Token>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Persist the token, replacing any previous contents
    ///
    /// Writes to a temporary file in the same directory and renames it
    /// into place, so a crash mid-write leaves the old token intact.
    pub fn save(&self, token: &Token) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut file, token)?;
        file.write_all(b"\n")?;
        file.persist(&self.path).map_err(|e| Sb1Error::Io(e.error))?;

        debug!(path = %self.path.display(), "token persisted");
        Ok(())
    }
}
