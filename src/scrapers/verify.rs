//! Optional reachability checks for article links.

use super::HttpSource;
use crate::models::{LinkCheck, YearDataset};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Outcome of a HEAD request after redirects.
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: u16,
    pub final_url: String,
}

/// Anything that can answer a HEAD request for a URL.
pub trait LinkChecker {
    async fn head(&self, url: &str) -> Result<HeadResponse, Box<dyn Error>>;
}

impl LinkChecker for HttpSource {
    #[instrument(level = "debug", skip(self))]
    async fn head(&self, url: &str) -> Result<HeadResponse, Box<dyn Error>> {
        let response = self.client.head(url).send().await?;
        Ok(HeadResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
        })
    }
}

/// Distinct article links in order of first appearance, capped at `limit`.
pub fn links_to_verify(dataset: &YearDataset, limit: usize) -> Vec<String> {
    dataset
        .all_links
        .iter()
        .map(|l| l.url.clone())
        .unique()
        .take(limit)
        .collect()
}

/// HEAD each URL in turn.
///
/// Transport failures are recorded on the [`LinkCheck`], never returned.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn verify_links<C: LinkChecker>(checker: &C, urls: Vec<String>) -> Vec<LinkCheck> {
    let total = urls.len();
    let checks: Vec<LinkCheck> = stream::iter(urls.into_iter().enumerate())
        .then(|(i, url)| async move {
            debug!(index = i + 1, total, %url, "Checking link");
            check_link(checker, url).await
        })
        .collect()
        .await;

    let valid = checks.iter().filter(|c| c.valid).count();
    info!(valid, total, "Verified links");
    checks
}

async fn check_link<C: LinkChecker>(checker: &C, url: String) -> LinkCheck {
    match checker.head(&url).await {
        Ok(response) => LinkCheck {
            final_url: (response.final_url != url).then_some(response.final_url),
            url,
            status: Some(response.status),
            valid: response.status < 400,
            error: None,
        },
        Err(e) => LinkCheck {
            url,
            status: None,
            valid: false,
            final_url: None,
            error: Some(e.to_string()),
        },
    }
}
