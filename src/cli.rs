//! Command-line interface definitions for sitemap_scout.
//!
//! Every option here can also come from the YAML config file; flags given on
//! the command line win. See [`crate::config`] for the merge rules.

use crate::outputs::OutputFormat;
use clap::Parser;

/// Command-line arguments for sitemap_scout.
///
/// # Examples
///
/// ```sh
/// # Try the default WordPress-style sitemap names on two sites
/// sitemap_scout https://www.example.com/ https://blog.example.org/
///
/// # Custom slugs, JSON output
/// sitemap_scout https://www.example.com/ --slug sitemap.xml --slug page-sitemap.xml \
///     --format json --output reports/example.json
///
/// # Sites from a file, table split into 4 files
/// sitemap_scout --sites-file competitors.txt --split 4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site roots to probe, e.g. https://www.example.com/ (slugs are appended verbatim)
    pub sites: Vec<String>,

    /// File with one site root per line (blank lines and # comments ignored)
    #[arg(short = 'f', long)]
    pub sites_file: Option<String>,

    /// Sitemap filename to try on each site; repeat for several
    #[arg(short, long = "slug")]
    pub slugs: Vec<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "SITEMAP_SCOUT_CONFIG")]
    pub config: Option<String>,

    /// Output file (default: sitemaps_<date>.<format>)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Split the output table into this many files
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub split: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,
}
