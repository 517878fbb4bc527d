//! Error types for sitemap discovery.
//!
//! Failures are split by how far they are allowed to travel:
//! - [`FetchError`] and [`SitemapError`] describe a single candidate URL and are
//!   caught inside the discovery loop, logged, and recorded as outcomes.
//! - [`Error`] is the crate-level type for everything that stops a run:
//!   bad arguments, unreadable configuration, output that cannot be written.

use thiserror::Error;

/// Result type for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for crate-level operations
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied arguments that cannot be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for the expected shape
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client could not be constructed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The run was abandoned before it finished
    #[error("Interrupted before discovery finished")]
    Interrupted,
}

/// Failure to retrieve a candidate URL.
///
/// Only transport-level problems land here; any HTTP status, including 404 and
/// 5xx, is a successful fetch from the client's point of view.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// URL that was being fetched
        url: String,
    },

    /// Connection, DNS, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Classify a reqwest error, pulling timeouts out into their own variant.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Failure to read a sitemap document.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// The XML reader rejected the document
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document is not a well-formed tree
    #[error("malformed document: {0}")]
    Malformed(String),

    /// A child of the root has no descendant with the required name
    #[error("entry {index} has no <{element}> element")]
    MissingElement {
        /// Zero-based position of the child element under the root
        index: usize,
        /// Local name that was expected
        element: &'static str,
    },
}

impl From<quick_xml::encoding::EncodingError> for SitemapError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        SitemapError::Xml(err.into())
    }
}
