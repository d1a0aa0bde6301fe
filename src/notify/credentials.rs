//! Sender credentials
//!
//! Loaded from a single-line secret file formatted as
//! `<address><SEP><password>`.

use crate::error::TransportError;

use std::fmt;
use std::fs;
use std::path::Path;

/// Default separator between address and password
pub const DEFAULT_SEPARATOR: &str = "_";

/// SMTP sender address and password
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    address: String,
    password: String,
}

impl Credentials {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
        }
    }

    /// Parse the `<address><SEP><password>` line
    ///
    /// Splits on the first separator, so the password may contain it.
    pub fn parse(line: &str, separator: &str) -> Result<Self, TransportError> {
        if separator.is_empty() {
            return Err(TransportError::Credentials("empty separator".to_string()));
        }

        let line = line.trim();
        let (address, password) = line.split_once(separator).ok_or_else(|| {
            TransportError::Credentials(format!("expected <address>{}<password>", separator))
        })?;

        if address.is_empty() || password.is_empty() {
            return Err(TransportError::Credentials(
                "address and password must both be non-empty".to_string(),
            ));
        }

        Ok(Self::new(address, password))
    }

    /// Read and parse a credentials file
    pub fn load<P: AsRef<Path>>(path: P, separator: &str) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TransportError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, separator)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}
