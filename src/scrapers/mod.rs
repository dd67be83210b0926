//! Document fetcher for the yearly review article.
//!
//! Fetching happens in two phases, mirroring how the rest of the pipeline
//! consumes it:
//!
//! 1. **Resolving**: build the ordered list of candidate URLs for a year
//!    (explicit override, else the known URL, else each slug variant)
//! 2. **Fetching**: try each candidate in order and keep the first body
//!    that comes back with a success status
//!
//! The transport sits behind [`PageSource`] so the pipeline can run against
//! canned HTML in tests.
//!
//! # Submodules
//!
//! - [`normalize`]: reduces the fetched HTML to ordered [`Block`](crate::models::Block)s
//! - [`verify`]: optional HEAD checks for article links

pub mod normalize;
pub mod verify;

use crate::config::SourceConfig;
use crate::error::{FetchAttempt, FetchError};
use itertools::Itertools;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Anything that can return the body of a URL.
pub trait PageSource {
    async fn get(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// [`PageSource`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// A successfully retrieved source article.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub html: String,
}

/// Candidate URLs for `year`, most likely first.
///
/// An explicit override replaces every other candidate.
pub fn candidate_urls(year: i32, url_override: Option<&str>, config: &SourceConfig) -> Vec<String> {
    if let Some(url) = url_override {
        return vec![url.to_string()];
    }
    let site = config.site.trim_end_matches('/');
    let known = config.known_urls.get(&year).cloned();
    let variants = config.slug_variants.iter().map(|slug| {
        let slug = slug.replace("{year}", &year.to_string());
        format!("{}/{}/{}/{}/{}/", site, year, config.month, config.day, slug)
    });
    known.into_iter().chain(variants).unique().collect()
}

/// Retrieve the article for `year`, trying each candidate URL in order.
///
/// # Errors
///
/// [`FetchError`] listing every attempted URL and why it failed.
#[instrument(level = "info", skip(config, source))]
pub async fn fetch_document<S: PageSource>(
    year: i32,
    url_override: Option<&str>,
    config: &SourceConfig,
    source: &S,
) -> Result<FetchedDocument, FetchError> {
    let mut attempts = Vec::new();
    for url in candidate_urls(year, url_override, config) {
        match source.get(&url).await {
            Ok(html) => {
                info!(%url, bytes = html.len(), "Fetched source article");
                return Ok(FetchedDocument { url, html });
            }
            Err(e) => {
                warn!(%url, error = %e, "Candidate URL failed");
                attempts.push(FetchAttempt {
                    url,
                    reason: e.to_string(),
                });
            }
        }
    }
    Err(FetchError { year, attempts })
}
