//! # sitemap_scout
//!
//! Discovers the XML sitemaps of websites by trying common sitemap filenames
//! and reads them into ordered `url` / `last_modified` rows.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitemap_scout::discovery::discover;
//! use sitemap_scout::fetch::{HttpFetcher, default_user_agent};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new(Duration::from_secs(20), &default_user_agent())?;
//!     let sites = vec!["https://www.example.com/".to_string()];
//!
//!     // None: try the built-in list of sitemap filenames
//!     let rows = discover(&fetcher, &sites, None).await?;
//!     for row in rows {
//!         println!("{}\t{}", row.url, row.last_modified.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod sitemap;
pub mod utils;

pub use discovery::{DEFAULT_SLUGS, discover, discover_with_report};
pub use error::{Error, Result};
pub use models::{ResultTable, SitemapEntry};
