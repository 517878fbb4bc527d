//! CSV output.
//!
//! ```text
//! url,last_modified
//! https://example.com/hello-world,2024-06-01T09:00:00+00:00
//! https://example.com/about,
//! ```
//!
//! The header is always written, even for an empty table. A missing
//! `last_modified` is an empty field.

use crate::error::Result;
use crate::models::SitemapEntry;
use csv::WriterBuilder;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Column names, in order.
pub const HEADER: [&str; 2] = ["url", "last_modified"];

/// Serialize rows to CSV bytes.
pub fn to_csv_bytes(rows: &[SitemapEntry]) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

/// Write rows to `path` as CSV, replacing any existing file.
#[instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub async fn write_csv(rows: &[SitemapEntry], path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(rows)?;
    debug!(bytes = bytes.len(), "Serialized CSV");
    fs::write(path, bytes).await?;
    Ok(())
}
