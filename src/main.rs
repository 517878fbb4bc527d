//! # sitemap_scout
//!
//! Finds the XML sitemaps of a list of websites by trying well-known sitemap
//! filenames, and turns every sitemap it finds into `url` / `last_modified`
//! rows written as CSV or JSON.
//!
//! ## Usage
//!
//! ```sh
//! sitemap_scout https://www.example.com/ -o example.csv
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Settings**: Merge command line, site-list file and config file
//! 2. **Discovery**: Build `site + slug` candidates and fetch them one by one
//! 3. **Parsing**: Read each fetched sitemap into rows, skipping failures
//! 4. **Output**: Write the rows as CSV or JSON, optionally split into fragments

use chrono::Local;
use clap::Parser;
use sitemap_scout::cli::Cli;
use sitemap_scout::config::{Config, Settings, load_config};
use sitemap_scout::discovery::discover_with_report;
use sitemap_scout::fetch::HttpFetcher;
use sitemap_scout::outputs;
use sitemap_scout::utils::{ensure_writable_dir, output_dir, read_site_list};
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sitemap_scout starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config & site list ----
    let config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let listed_sites = match args.sites_file.as_deref() {
        Some(path) => read_site_list(path).await?,
        None => Vec::new(),
    };
    let settings = Settings::resolve(args, config, listed_sites, Local::now().date_naive());
    info!(
        sites = settings.sites.len(),
        custom_slugs = settings.slugs.is_some(),
        timeout_secs = settings.timeout.as_secs(),
        format = ?settings.format,
        output = %settings.output.display(),
        "Resolved settings"
    );
    if settings.sites.is_empty() {
        warn!("No site roots given; the result will be empty");
    }

    // Early check: ensure the output dir is writable before spending time on the network
    let dir = output_dir(&settings.output);
    if let Err(e) = ensure_writable_dir(dir).await {
        error!(
            path = %dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // ---- Discover ----
    let fetcher = HttpFetcher::new(settings.timeout, &settings.user_agent)?;
    debug!(timeout = ?fetcher.timeout(), "HTTP client ready");

    let slugs = settings.slugs.as_deref();
    let report = tokio::select! {
        result = discover_with_report(&fetcher, &settings.sites, slugs) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; abandoning run without writing output");
            return Err(sitemap_scout::Error::Interrupted.into());
        }
    };

    // ---- Output ----
    let written = outputs::write_report(&report, &settings.output, settings.format, settings.split)
        .await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        rows = report.entries.len(),
        sitemaps = report.parsed_count(),
        not_found = report.not_found_count(),
        failed = report.failed_count(),
        files = written.len(),
        "Execution complete"
    );

    Ok(())
}
