//! Loading the record list from its JSON resource.
//!
//! The resource is either a local file or an `http(s)://` URL fetched with a
//! single GET through the synchronous `ureq` client. Any failure leaves the
//! caller's state untouched; nothing is returned until the whole document
//! has parsed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::Record;

/// Where the record list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Classify a configured source string: URLs by scheme, anything else is
    /// a filesystem path.
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed record JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load and parse the full record list.
pub fn load(source: &DataSource, timeout: Duration) -> Result<Vec<Record>, LoadError> {
    let body = match source {
        DataSource::File(path) => read_file(path)?,
        DataSource::Url(url) => fetch(url, timeout)?,
    };
    parse_records(&body, &source.to_string())
}

/// Parse a JSON array of records.
pub fn parse_records(body: &str, origin: &str) -> Result<Vec<Record>, LoadError> {
    serde_json::from_str(body).map_err(|source| LoadError::Json {
        origin: origin.to_string(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn fetch(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let response = match ureq::get(url).timeout(timeout).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(status, _)) => {
            return Err(LoadError::Status {
                url: url.to_string(),
                status,
            });
        }
        Err(e) => {
            return Err(LoadError::Http {
                url: url.to_string(),
                message: e.to_string(),
            });
        }
    };

    response.into_string().map_err(|source| LoadError::Io {
        path: url.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
