//! JSON output.
//!
//! The document carries the rows plus the outcome of every candidate URL,
//! which makes it the format to use when a run needs to be audited:
//!
//! ```json
//! {
//!   "generated_at": "2025-05-06T10:00:00+00:00",
//!   "fragment": null,
//!   "row_count": 1,
//!   "entries": [{ "url": "https://example.com/a", "last_modified": "2024-01-01" }],
//!   "candidates": [
//!     { "url": "https://example.com/post-sitemap.xml", "kind": "parsed", "entries": 1 },
//!     { "url": "https://example.com/post-sitemap1.xml", "kind": "not_found" }
//!   ]
//! }
//! ```

use crate::error::Result;
use crate::models::{CandidateOutcome, SitemapEntry};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{error, instrument};

/// Position of a document within a split output.
#[derive(Debug, Serialize)]
pub struct Fragment {
    /// 1-based fragment number.
    pub index: usize,
    /// Total number of fragments.
    pub count: usize,
}

/// Serialized shape of a JSON output file.
#[derive(Debug, Serialize)]
pub struct JsonDocument<'a> {
    /// RFC 3339 UTC timestamp of when the file was written.
    pub generated_at: String,
    /// Set when the output was split into several files.
    pub fragment: Option<Fragment>,
    /// Number of rows in `entries`.
    pub row_count: usize,
    /// The rows.
    pub entries: &'a [SitemapEntry],
    /// Outcome of every candidate URL of the run.
    pub candidates: &'a [CandidateOutcome],
}

/// Write rows and candidate outcomes to `path` as pretty-printed JSON.
///
/// # Arguments
///
/// * `rows` - Entries for this file
/// * `candidates` - Outcomes of the whole run
/// * `fragment` - `(index, count)` when writing one of several fragments
/// * `path` - Destination file, replaced if it exists
#[instrument(level = "info", skip(rows, candidates), fields(rows = rows.len()))]
pub async fn write_json(
    rows: &[SitemapEntry],
    candidates: &[CandidateOutcome],
    fragment: Option<(usize, usize)>,
    path: &Path,
) -> Result<()> {
    let document = JsonDocument {
        generated_at: Utc::now().to_rfc3339(),
        fragment: fragment.map(|(index, count)| Fragment { index, count }),
        row_count: rows.len(),
        entries: rows,
        candidates,
    };
    let json = serde_json::to_string_pretty(&document)?;

    if let Err(e) = fs::write(path, json).await {
        error!(path = %path.display(), error = %e, "Failed to write JSON");
        return Err(e.into());
    }
    Ok(())
}
