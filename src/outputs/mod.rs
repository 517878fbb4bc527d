//! Output generation for discovered sitemap rows.
//!
//! The discovery pipeline hands back an in-memory [`DiscoveryReport`]; this
//! module turns it into files.
//!
//! # Submodules
//!
//! - [`csv`]: `url,last_modified` table, one row per sitemap entry
//! - [`json`]: entries plus per-candidate outcomes, for scripting
//!
//! # Splitting
//!
//! Large tables can be written as several fragment files. With `--split 3`
//! and `--output sites.csv` the files are:
//!
//! ```text
//! 1_sites.csv
//! 2_sites.csv
//! 3_sites.csv
//! ```
//!
//! Every fragment holds `len / n` rows, except the last which also takes the
//! remainder, so no row is dropped.

pub mod csv;
pub mod json;

use crate::error::Result;
use crate::models::DiscoveryReport;
use clap::ValueEnum;
use serde::Deserialize;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// File format of the written table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Pretty-printed JSON document
    Json,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Row ranges for `parts` fragments of a `len`-row table.
///
/// Fragments are `len / parts` rows long; the last one runs to the end of
/// the table. `parts` of zero is treated as one.
pub fn split_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let step = len / parts;
    (0..parts)
        .map(|i| {
            let start = i * step;
            let end = if i + 1 == parts { len } else { start + step };
            start..end
        })
        .collect()
}

/// Path of fragment `index` (1-based): `dir/<index>_<file name>`.
pub fn fragment_path(path: &Path, index: usize) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{index}_{name}"))
}

/// Destination file, its row range and its `(index, count)` fragment tag.
type Target = (PathBuf, Range<usize>, Option<(usize, usize)>);

/// Write the report in `format`, as one file or as `split` fragments.
///
/// Any `split`, including `Some(1)`, names the files as fragments.
///
/// # Returns
///
/// The paths written, in fragment order.
#[instrument(level = "info", skip(report), fields(rows = report.entries.len()))]
pub async fn write_report(
    report: &DiscoveryReport,
    path: &Path,
    format: OutputFormat,
    split: Option<usize>,
) -> Result<Vec<PathBuf>> {
    let len = report.entries.len();
    let targets: Vec<Target> = match split {
        Some(parts) => {
            let parts = parts.max(1);
            let ranges = split_ranges(len, parts);
            ranges
                .into_iter()
                .enumerate()
                .map(|(i, range)| (fragment_path(path, i + 1), range, Some((i + 1, parts))))
                .collect()
        }
        None => vec![(path.to_path_buf(), 0..len, None)],
    };

    let outcomes = &report.outcomes;
    let mut written = Vec::with_capacity(targets.len());
    for (target, range, fragment) in targets {
        let rows = &report.entries[range];
        match format {
            OutputFormat::Csv => csv::write_csv(rows, &target).await?,
            OutputFormat::Json => json::write_json(rows, outcomes, fragment, &target).await?,
        }
        info!(path = %target.display(), rows = rows.len(), "Wrote output file");
        written.push(target);
    }
    Ok(written)
}
