//! Sitemap discovery: guess sitemap locations, fetch them, collect their rows.
//!
//! Most sites built on common CMSes publish their sitemaps under a handful of
//! predictable filenames. Given a list of site roots and a list of such
//! filenames ("slugs"), this module tries every combination and gathers the
//! entries of whatever turns out to exist.
//!
//! # Pipeline
//!
//! 1. **Validate**: every site root must be an absolute `http(s)` URL
//! 2. **Deduplicate**: repeated slugs are dropped, first occurrence wins
//! 3. **Combine**: `site + slug` for each site, then each slug (plain string
//!    concatenation, so `https://a.com` + `x.xml` gives `https://a.comx.xml`)
//! 4. **Fetch and parse**: one candidate at a time, in order
//! 5. **Accumulate**: rows of each parsed sitemap are appended as a group
//!
//! # Failure isolation
//!
//! Nothing that goes wrong with a single candidate stops the run:
//!
//! | Situation | Outcome | Log level |
//! |-----------|---------|-----------|
//! | HTTP 404 | [`OutcomeKind::NotFound`] | info |
//! | Any other status >= 400 | [`OutcomeKind::FetchFailed`] | warn |
//! | Timeout, connection failure | [`OutcomeKind::FetchFailed`] | warn |
//! | Body is not a valid sitemap | [`OutcomeKind::ParseFailed`] | warn |
//!
//! Only invalid arguments are returned as errors, and they are detected before
//! the first request goes out.
//!
//! # Cancellation
//!
//! The returned futures hold no resources besides the in-flight request, so a
//! caller abandons a run by dropping the future.

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::models::{CandidateOutcome, DiscoveryReport, OutcomeKind, ResultTable, SitemapEntry};
use crate::sitemap::parse_sitemap;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Sitemap filenames tried when the caller does not supply any.
pub const DEFAULT_SLUGS: [&str; 7] = [
    "post-sitemap.xml",
    "post_sitemap_1.xml",
    "post_sitemap_2.xml",
    "post_sitemap_3.xml",
    "post-sitemap1.xml",
    "post-sitemap2.xml",
    "post-sitemap3.xml",
];

/// [`DEFAULT_SLUGS`] as owned strings.
pub fn default_slugs() -> Vec<String> {
    DEFAULT_SLUGS.iter().map(|s| s.to_string()).collect()
}

/// Drop repeated slugs, keeping the first occurrence of each.
pub fn dedupe_slugs(slugs: &[String]) -> Vec<String> {
    slugs.iter().unique().cloned().collect()
}

/// Every `site + slug` combination, sites in the outer loop.
///
/// Concatenation is literal. No separator is added or removed.
pub fn build_candidate_urls(site_roots: &[String], slugs: &[String]) -> Vec<String> {
    site_roots
        .iter()
        .cartesian_product(slugs.iter())
        .map(|(site, slug)| format!("{site}{slug}"))
        .collect()
}

/// Check that every site root is an absolute `http` or `https` URL.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming the first offending entry.
pub fn validate_site_roots(site_roots: &[String]) -> Result<()> {
    for (i, site) in site_roots.iter().enumerate() {
        if site.trim().is_empty() {
            return Err(Error::InvalidInput(format!("site root #{i} is empty")));
        }
        let parsed = Url::parse(site)
            .map_err(|e| Error::InvalidInput(format!("site root {site:?} is not a URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "site root {site:?} must use http or https, not {}",
                parsed.scheme()
            )));
        }
    }
    Ok(())
}

/// Discover sitemaps and return their rows.
///
/// `slugs` defaults to [`DEFAULT_SLUGS`] when `None`. See
/// [`discover_with_report`] for per-candidate outcomes.
///
/// # Errors
///
/// Only [`Error::InvalidInput`], raised before any request is made.
pub async fn discover<F: Fetch>(
    fetcher: &F,
    site_roots: &[String],
    slugs: Option<&[String]>,
) -> Result<ResultTable> {
    let report = discover_with_report(fetcher, site_roots, slugs).await?;
    Ok(report.entries)
}

/// Discover sitemaps, returning both the rows and what happened to every
/// candidate URL.
#[instrument(level = "info", skip_all, fields(sites = site_roots.len()))]
pub async fn discover_with_report<F: Fetch>(
    fetcher: &F,
    site_roots: &[String],
    slugs: Option<&[String]>,
) -> Result<DiscoveryReport> {
    validate_site_roots(site_roots)?;

    let slugs = match slugs {
        Some(s) => dedupe_slugs(s),
        None => default_slugs(),
    };
    let candidates = build_candidate_urls(site_roots, &slugs);
    info!(
        sites = site_roots.len(),
        slugs = slugs.len(),
        candidates = candidates.len(),
        "Built candidate sitemap URLs"
    );
    debug!(urls = ?candidates, "Candidates");

    let results: Vec<(CandidateOutcome, Vec<SitemapEntry>)> = stream::iter(candidates)
        .then(|url: String| async move {
            let (kind, entries) = process_candidate(fetcher, &url).await;
            (CandidateOutcome { url, kind }, entries)
        })
        .collect()
        .await;

    let mut report = DiscoveryReport::default();
    for (outcome, entries) in results {
        report.entries.extend(entries);
        report.outcomes.push(outcome);
    }

    info!(
        rows = report.entries.len(),
        parsed = report.parsed_count(),
        not_found = report.not_found_count(),
        failed = report.failed_count(),
        "Sitemap discovery complete"
    );
    Ok(report)
}

/// Fetch and parse one candidate. Never fails; problems become outcomes.
#[instrument(level = "info", skip(fetcher))]
async fn process_candidate<F: Fetch>(fetcher: &F, url: &str) -> (OutcomeKind, Vec<SitemapEntry>) {
    let response = match fetcher.get(url).await {
        Ok(r) => r,
        Err(e) => {
            warn!(%url, error = %e, "Sitemap fetch failed");
            return (
                OutcomeKind::FetchFailed {
                    reason: e.to_string(),
                },
                Vec::new(),
            );
        }
    };

    if response.is_not_found() {
        info!(%url, status = response.status, "No sitemap at candidate");
        return (OutcomeKind::NotFound, Vec::new());
    }

    if response.is_failure() {
        warn!(%url, status = response.status, "Sitemap fetch returned error status");
        return (
            OutcomeKind::FetchFailed {
                reason: format!("HTTP {}", response.status),
            },
            Vec::new(),
        );
    }

    info!(%url, status = response.status, "Fetched sitemap");
    match parse_sitemap(&response.body) {
        Ok(entries) => {
            info!(%url, count = entries.len(), "Parsed sitemap");
            (
                OutcomeKind::Parsed {
                    entries: entries.len(),
                },
                entries,
            )
        }
        Err(e) => {
            warn!(%url, error = %e, "Sitemap parse failed");
            debug!(
                body_preview = %truncate_for_log(&String::from_utf8_lossy(&response.body), 300),
                "Unparseable body"
            );
            (
                OutcomeKind::ParseFailed {
                    reason: e.to_string(),
                },
                Vec::new(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::HttpFetcher;
    use crate::models::FetchResponse;
    use mockito::Server;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;

    enum Reply {
        Status(u16, String),
        Timeout,
    }

    /// Deterministic fetcher: unknown URLs answer 404, every call is recorded.
    #[derive(Default)]
    struct StubFetcher {
        replies: HashMap<String, Reply>,
        calls: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn reply(mut self, url: &str, status: u16, body: &str) -> Self {
            self.replies
                .insert(url.to_string(), Reply::Status(status, body.to_string()));
            self
        }

        fn timeout(mut self, url: &str) -> Self {
            self.replies.insert(url.to_string(), Reply::Timeout);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Fetch for StubFetcher {
        async fn get(&self, url: &str) -> std::result::Result<FetchResponse, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            match self.replies.get(url) {
                Some(Reply::Status(status, body)) => Ok(FetchResponse::new(*status, body.clone())),
                Some(Reply::Timeout) => Err(FetchError::Timeout {
                    url: url.to_string(),
                }),
                None => Ok(FetchResponse::new(404, "Not Found")),
            }
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sitemap(pairs: &[(&str, &str)]) -> String {
        let urls: String = pairs
            .iter()
            .map(|(loc, lastmod)| {
                format!("<url><loc>{loc}</loc><lastmod>{lastmod}</lastmod></url>")
            })
            .collect();
        format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{urls}</urlset>"#)
    }

    fn row(url: &str, lastmod: &str) -> SitemapEntry {
        SitemapEntry {
            url: url.to_string(),
            last_modified: Some(lastmod.to_string()),
        }
    }

    fn urls(table: &[SitemapEntry]) -> Vec<&str> {
        table.iter().map(|e| e.url.as_str()).collect()
    }

    async fn run(fetcher: &StubFetcher, sites: &[&str], slugs: &[&str]) -> DiscoveryReport {
        let sites = strings(sites);
        let slugs = strings(slugs);
        discover_with_report(fetcher, &sites, Some(&slugs[..]))
            .await
            .unwrap()
    }

    #[test]
    fn test_default_slugs() {
        let slugs = default_slugs();
        assert_eq!(slugs.len(), 7);
        assert_eq!(slugs[0], "post-sitemap.xml");
        assert_eq!(dedupe_slugs(&slugs), slugs);
    }

    #[test]
    fn test_dedupe_keeps_first_seen_order() {
        let slugs = strings(&["b.xml", "a.xml", "b.xml", "c.xml", "a.xml"]);
        assert_eq!(dedupe_slugs(&slugs), strings(&["b.xml", "a.xml", "c.xml"]));
    }

    #[test]
    fn test_candidates_are_literal_concatenation() {
        let urls = build_candidate_urls(
            &strings(&["https://a.com/", "https://b.com"]),
            &strings(&["x.xml", "y.xml"]),
        );
        assert_eq!(
            urls,
            strings(&[
                "https://a.com/x.xml",
                "https://a.com/y.xml",
                "https://b.comx.xml",
                "https://b.comy.xml",
            ])
        );
    }

    #[test]
    fn test_validate_site_roots() {
        let valid = strings(&["https://a.com", "http://b.com/"]);
        assert!(validate_site_roots(&valid).is_ok());
        assert!(matches!(
            validate_site_roots(&strings(&["https://a.com", "  "])),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            validate_site_roots(&strings(&["www.example.com"])),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            validate_site_roots(&strings(&["ftp://example.com/"])),
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_cartesian_completeness() {
        let fetcher = StubFetcher::default();
        let sites = ["https://a.com/", "https://b.com/"];

        let report = run(&fetcher, &sites, &["x.xml", "y.xml"]).await;
        assert!(report.entries.is_empty());
        assert_eq!(
            fetcher.calls(),
            strings(&[
                "https://a.com/x.xml",
                "https://a.com/y.xml",
                "https://b.com/x.xml",
                "https://b.com/y.xml",
            ])
        );
    }

    #[tokio::test]
    async fn test_not_found_contributes_nothing() {
        let ghost = sitemap(&[("https://a.com/ghost", "2020")]);
        let real = sitemap(&[("https://a.com/real", "2024")]);
        let fetcher = StubFetcher::default()
            .reply("https://a.com/x.xml", 404, &ghost)
            .reply("https://a.com/y.xml", 200, &real);
        let slugs = ["x.xml", "y.xml"];

        let report = run(&fetcher, &["https://a.com/"], &slugs).await;
        assert_eq!(report.entries, vec![row("https://a.com/real", "2024")]);
        assert_eq!(report.outcomes[0].kind, OutcomeKind::NotFound);
        assert_eq!(report.outcomes[1].kind, OutcomeKind::Parsed { entries: 1 });
    }

    #[tokio::test]
    async fn test_entries_match_source_text() {
        let body = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://a.com/one</loc><lastmod>2024-03-01T10:00:00+01:00</lastmod></url>
  <url><loc>https://a.com/two</loc><lastmod>2024-03-02</lastmod></url>
</urlset>"#;
        let fetcher = StubFetcher::default()
            .reply("https://a.com/post-sitemap.xml", 200, body);
        let sites = strings(&["https://a.com/"]);

        let table = discover(&fetcher, &sites, None).await.unwrap();
        assert_eq!(
            table,
            vec![
                row("https://a.com/one", "2024-03-01T10:00:00+01:00"),
                row("https://a.com/two", "2024-03-02"),
            ]
        );
        // Default slugs were all tried.
        assert_eq!(fetcher.calls().len(), DEFAULT_SLUGS.len());
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let fetcher = StubFetcher::default();

        let table = discover(&fetcher, &[], None).await.unwrap();
        assert!(table.is_empty());
        assert!(fetcher.calls().is_empty());

        let sites = strings(&["https://a.com/"]);
        let table = discover(&fetcher, &sites, Some(&[][..])).await.unwrap();
        assert!(table.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_group_order_follows_fetch_order() {
        let a = sitemap(&[("https://a.com/1", "d1"), ("https://a.com/2", "d2")]);
        let b = sitemap(&[("https://b.com/3", "d3")]);
        let fetcher = StubFetcher::default()
            .reply("https://a.com/x.xml", 200, &a)
            .reply("https://b.com/x.xml", 200, &b);
        let sites = ["https://a.com/", "https://b.com/"];

        let report = run(&fetcher, &sites, &["x.xml"]).await;
        assert_eq!(
            urls(&report.entries),
            ["https://a.com/1", "https://a.com/2", "https://b.com/3"]
        );
    }

    #[tokio::test]
    async fn test_malformed_candidate_is_isolated() {
        let first = sitemap(&[("https://a.com/p1", "d1")]);
        let third = sitemap(&[("https://a.com/p3", "d3")]);
        let fetcher = StubFetcher::default()
            .reply("https://a.com/1.xml", 200, &first)
            .reply("https://a.com/2.xml", 200, "<urlset><url><loc>broken")
            .reply("https://a.com/3.xml", 200, &third);
        let slugs = ["1.xml", "2.xml", "3.xml"];

        let report = run(&fetcher, &["https://a.com/"], &slugs).await;
        let got = urls(&report.entries);
        assert_eq!(got, ["https://a.com/p1", "https://a.com/p3"]);
        assert!(matches!(
            report.outcomes[1].kind,
            OutcomeKind::ParseFailed { .. }
        ));
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_error_status_and_timeout_are_skipped() {
        let error_page = sitemap(&[("https://a.com/from-error-page", "d")]);
        let ok = sitemap(&[("https://a.com/ok", "d")]);
        let fetcher = StubFetcher::default()
            .reply("https://a.com/x.xml", 500, &error_page)
            .timeout("https://a.com/y.xml")
            .reply("https://a.com/z.xml", 200, &ok);
        let slugs = ["x.xml", "y.xml", "z.xml"];

        let report = run(&fetcher, &["https://a.com/"], &slugs).await;
        assert_eq!(report.entries, vec![row("https://a.com/ok", "d")]);
        assert_eq!(
            report.outcomes[0].kind,
            OutcomeKind::FetchFailed {
                reason: "HTTP 500".to_string()
            }
        );
        assert!(matches!(
            report.outcomes[1].kind,
            OutcomeKind::FetchFailed { .. }
        ));
        assert_eq!(report.parsed_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_site_fails_before_any_fetch() {
        let fetcher = StubFetcher::default();
        let sites = strings(&["https://a.com/", "not a url"]);

        let err = discover(&fetcher, &sites, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let a = sitemap(&[("https://a.com/1", "d1")]);
        let b = sitemap(&[("https://b.com/2", "d2")]);
        let fetcher = StubFetcher::default()
            .reply("https://a.com/x.xml", 200, &a)
            .reply("https://b.com/y.xml", 200, &b);
        let sites = ["https://a.com/", "https://b.com/"];
        let slugs = ["y.xml", "x.xml", "y.xml"];

        let first = run(&fetcher, &sites, &slugs).await;
        let second = run(&fetcher, &sites, &slugs).await;
        assert_eq!(first, second);
        let got = urls(&first.entries);
        assert_eq!(got, ["https://a.com/1", "https://b.com/2"]);
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let mut server = Server::new_async().await;
        let body = sitemap(&[("https://example.com/hello-world", "2024-06-01")]);
        let found = server
            .mock("GET", "/post-sitemap.xml")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(body)
            .expect(1)
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/post-sitemap1.xml")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let timeout = Duration::from_secs(5);
        let fetcher = HttpFetcher::new(timeout, "sitemap_scout-test").unwrap();
        let sites = vec![format!("{}/", server.url())];
        let slugs = strings(&["post-sitemap.xml", "post-sitemap1.xml"]);
        let slugs = Some(slugs.as_slice());

        let table = discover(&fetcher, &sites, slugs).await.unwrap();
        assert_eq!(urls(&table), ["https://example.com/hello-world"]);
        assert_eq!(table[0].last_modified.as_deref(), Some("2024-06-01"));

        found.assert_async().await;
        missing.assert_async().await;
    }
}
