//! Utility functions for logging, site lists, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging response bodies
//! - Parsing of one-site-per-line lists
//! - File system validation for output locations

use crate::error::Result;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Parse a site list: one site root per line.
///
/// Surrounding whitespace is stripped; blank lines and lines starting with
/// `#` are skipped. Order is preserved and duplicates are kept.
pub fn parse_site_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read a site list file. See [`parse_site_list`].
#[instrument(level = "info")]
pub async fn read_site_list(path: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).await?;
    let sites = parse_site_list(&text);
    info!(count = sites.len(), "Loaded site list");
    Ok(sites)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    if let Err(e) = stdfs::remove_file(&probe_path) {
        debug!(path = %probe_path.display(), error = %e, "Could not remove write probe");
    }
    info!("Output directory is writable");
    Ok(())
}

/// Directory an output file will be written into.
///
/// A bare file name lives in the current directory.
pub fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
