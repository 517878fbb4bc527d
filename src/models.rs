//! Data models for sitemap discovery and its results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SitemapEntry`]: One `url` / `last_modified` row read from a sitemap
//! - [`ResultTable`]: Ordered rows across every sitemap that was read
//! - [`FetchResponse`]: Status and raw body returned by a fetcher
//! - [`CandidateOutcome`] and [`DiscoveryReport`]: Per-candidate bookkeeping

use serde::{Deserialize, Serialize};

/// A single row extracted from a sitemap document.
///
/// Both fields keep the document text exactly as found: no trimming, no date
/// parsing. The parser requires a `lastmod` element for every entry;
/// `last_modified` is `None` when that element is empty (`<lastmod/>`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SitemapEntry {
    /// Text of the entry's `<loc>` element.
    pub url: String,
    /// Text of the entry's `<lastmod>` element.
    pub last_modified: Option<String>,
}

/// Ordered rows from every successfully read sitemap, in fetch order.
pub type ResultTable = Vec<SitemapEntry>;

/// Raw response for one GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code of the final response.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Convenience constructor, mostly for stub fetchers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for HTTP 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// `true` for client and server error statuses other than 404.
    pub fn is_failure(&self) -> bool {
        self.status >= 400 && !self.is_not_found()
    }
}

/// What happened to one candidate sitemap URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Document was fetched and every entry parsed.
    Parsed {
        /// Number of rows contributed to the result table.
        entries: usize,
    },
    /// Server answered 404; expected for most guessed slugs.
    NotFound,
    /// Transport failure or an error status other than 404.
    FetchFailed {
        /// Human-readable cause.
        reason: String,
    },
    /// Body could not be read as a sitemap.
    ParseFailed {
        /// Human-readable cause.
        reason: String,
    },
}

impl OutcomeKind {
    /// `true` for fetch and parse failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::ParseFailed { .. })
    }
}

/// Outcome of one candidate URL, in the order candidates were attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateOutcome {
    /// The candidate URL (site root + slug).
    pub url: String,
    /// What happened.
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

/// Full result of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Rows from every parsed sitemap, in fetch order.
    pub entries: ResultTable,
    /// One outcome per attempted candidate, in attempt order.
    pub outcomes: Vec<CandidateOutcome>,
}

impl DiscoveryReport {
    /// Number of candidates that were parsed successfully.
    pub fn parsed_count(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Parsed { .. }))
    }

    /// Number of candidates that answered 404.
    pub fn not_found_count(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::NotFound))
    }

    /// Number of candidates that failed to fetch or parse.
    pub fn failed_count(&self) -> usize {
        self.count(OutcomeKind::is_failure)
    }

    fn count(&self, pred: impl Fn(&OutcomeKind) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.kind)).count()
    }
}
