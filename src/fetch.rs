//! HTTP retrieval of candidate sitemap URLs.
//!
//! The discovery pipeline only needs "GET this URL, give me the status and the
//! bytes", so that is all the [`Fetch`] trait asks for. [`HttpFetcher`] is the
//! real implementation on top of `reqwest`; tests substitute deterministic
//! stubs.
//!
//! A fetcher never interprets the status code. A 404 or a 503 is a successful
//! fetch here; deciding what those mean is the pipeline's job.

use crate::error::{Error, FetchError};
use crate::models::FetchResponse;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default `User-Agent` header
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Trait for retrieving a URL.
///
/// Implementors return the final status code and the full body, or a
/// [`FetchError`] when no response could be obtained at all.
pub trait Fetch {
    /// Issue a GET request for `url`.
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// `reqwest`-backed fetcher with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Upper bound for a whole request, connect to last body byte
    /// * `user_agent` - Value of the `User-Agent` header
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, timeout })
    }

    /// The configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let dt = t0.elapsed();

        debug!(
            elapsed_ms = dt.as_millis() as u64,
            status,
            bytes = body.len(),
            "Fetched"
        );

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
