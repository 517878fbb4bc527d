//! Configuration file loading and merging with command-line flags.
//!
//! The config file is optional YAML; every field may be omitted:
//!
//! ```yaml
//! sites:
//!   - https://www.example.com/
//!   - https://blog.example.org/
//! slugs:
//!   - post-sitemap.xml
//!   - page-sitemap.xml
//! timeout_secs: 20
//! user_agent: "sitemap_scout/0.1.0"
//! output_format: csv
//! ```
//!
//! Precedence is command line, then config file, then built-in default.

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::fetch::{DEFAULT_TIMEOUT_SECS, default_user_agent};
use crate::outputs::OutputFormat;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// Contents of a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Site roots to probe.
    pub sites: Vec<String>,
    /// Sitemap filenames; `None` means the built-in list.
    pub slugs: Option<Vec<String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
    /// Output file format.
    pub output_format: Option<OutputFormat>,
}

/// Parse config YAML.
///
/// An empty document is the default config.
pub fn parse_config(text: &str) -> Result<Config> {
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(text)?;
    if config.timeout_secs == Some(0) {
        return Err(Error::Config("timeout_secs must be at least 1".to_string()));
    }
    Ok(config)
}

/// Load a config file from `path`.
///
/// # Errors
///
/// [`Error::Config`] if the file cannot be read, [`Error::Yaml`] if it is
/// not valid config YAML.
#[instrument(level = "info")]
pub fn load_config(path: &str) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {path}: {e}")))?;
    let config = parse_config(&text)?;
    info!(
        sites = config.sites.len(),
        custom_slugs = config.slugs.is_some(),
        "Loaded configuration"
    );
    Ok(config)
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Site roots, in probe order.
    pub sites: Vec<String>,
    /// Slugs, `None` for the built-in list.
    pub slugs: Option<Vec<String>>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header.
    pub user_agent: String,
    /// Output format.
    pub format: OutputFormat,
    /// Output path (or fragment name template when split).
    pub output: PathBuf,
    /// Number of output fragments, if splitting.
    pub split: Option<usize>,
}

impl Settings {
    /// Merge command line, site-list file contents and config file.
    ///
    /// Sites given on the command line and in the site-list file are used
    /// together (command line first); the config file's sites are used only
    /// when neither supplies any. `today` names the default output file.
    pub fn resolve(cli: Cli, config: Config, listed_sites: Vec<String>, today: NaiveDate) -> Self {
        let mut sites = cli.sites;
        sites.extend(listed_sites);
        if sites.is_empty() {
            sites = config.sites;
        }

        let slugs = if cli.slugs.is_empty() {
            config.slugs
        } else {
            Some(cli.slugs)
        };

        let format = cli.format.or(config.output_format).unwrap_or_default();
        let output = match cli.output {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!(
                "sitemaps_{}.{}",
                today.format("%Y-%m-%d"),
                format.extension()
            )),
        };

        let timeout_secs = cli
            .timeout_secs
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            sites,
            slugs,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: cli
                .user_agent
                .or(config.user_agent)
                .unwrap_or_else(default_user_agent),
            format,
            output,
            split: cli.split.map(|n| n as usize),
        }
    }
}
