//! Per-year pipeline: fetch → normalize → extract → [`YearDataset`].
//!
//! Years in a batch run one after another. Each run builds its dataset from
//! scratch and either succeeds completely or yields a [`YearError`]; a
//! failure never leaves a partial dataset behind and never stops the batch.

use crate::config::PipelineConfig;
use crate::error::YearError;
use crate::extract::Engine;
use crate::models::{Block, Link, YearDataset};
use chrono::Utc;
use crate::scrapers::normalize::normalize_document;
use crate::scrapers::{PageSource, fetch_document};
use tracing::{error, info, instrument};

/// Run the whole pipeline for one year.
#[instrument(level = "info", skip(config, engine, source))]
pub async fn run_year<S: PageSource>(
    year: i32,
    url_override: Option<&str>,
    config: &PipelineConfig,
    engine: &Engine,
    source: &S,
) -> Result<YearDataset, YearError> {
    let fetched = fetch_document(year, url_override, &config.source, source).await?;
    let scraped_at = Utc::now().to_rfc3339();
    let normalized = normalize_document(&fetched.html, &fetched.url, &config.normalize)?;
    let themes = config.themes_for(year);
    let events = engine.extract(year, &normalized.blocks, &themes)?;

    Ok(YearDataset {
        year,
        source: fetched.url,
        title: normalized.title,
        scraped_at,
        events,
        themes,
        all_links: article_links(&normalized.blocks),
        link_verification: None,
    })
}

/// Every anchor with text across `blocks`, in document order.
fn article_links(blocks: &[Block]) -> Vec<Link> {
    blocks
        .iter()
        .flat_map(|b| b.links.iter())
        .filter(|l| !l.text.is_empty())
        .cloned()
        .collect()
}

/// Run each year in order, collecting one result per year.
pub async fn run_batch<S: PageSource>(
    years: &[i32],
    url_override: Option<&str>,
    config: &PipelineConfig,
    engine: &Engine,
    source: &S,
) -> Vec<(i32, Result<YearDataset, YearError>)> {
    let mut results = Vec::with_capacity(years.len());
    for &year in years {
        let result = run_year(year, url_override, config, engine, source).await;
        match &result {
            Ok(dataset) => info!(year, events = dataset.events.len(), "Year processed"),
            Err(e) => error!(year, kind = e.kind(), error = %e, "Year failed"),
        }
        results.push((year, result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::scrapers::tests::StaticSource;

    const URL_2025: &str = "https://simonwillison.net/2025/Dec/31/the-year-in-llms/";

    const ARTICLE: &str = r#"<html><body><article>
<h2>The year in LLMs</h2>
<p>Another year, <a href="/2024/">another review</a>.</p>
<h3>The reasoning trend</h3>
<p>OpenAI released <a href="https://openai.com/o1">o1</a> in September, the first of many reasoning models.</p>
<h3>Cheaper tokens</h3>
<p>Prices fell again: $0.15 per million tokens for a capable model.</p>
<h3>Nothing much</h3>
<p>we went for a walk.</p>
<div class="entryFooter"><p>Posted 31st December 2025</p></div>
</article></body></html>"#;

    fn engine(config: &PipelineConfig) -> Engine {
        Engine::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_run_year_builds_dataset() {
        let config = PipelineConfig::default();
        let source = StaticSource::with(&[(URL_2025, ARTICLE)]);
        let ds = run_year(2025, None, &config, &engine(&config), &source)
            .await
            .unwrap();
        assert_eq!(ds.year, 2025);
        assert_eq!(ds.source, URL_2025);
        assert_eq!(ds.title, "The year in LLMs");
        assert_eq!(ds.themes, config.default_themes);
        let titles: Vec<&str> = ds.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["The reasoning trend", "Cheaper tokens"]);
        assert_eq!(ds.events[0].category, Category::Models);
        assert_eq!(ds.events[0].date.as_deref(), Some("2025-09"));
        assert_eq!(ds.events[1].category, Category::Pricing);
        assert!(chrono::DateTime::parse_from_rfc3339(&ds.scraped_at).is_ok());
    }

    #[tokio::test]
    async fn test_all_links_cover_the_whole_article() {
        let config = PipelineConfig::default();
        let source = StaticSource::with(&[(URL_2025, ARTICLE)]);
        let ds = run_year(2025, None, &config, &engine(&config), &source)
            .await
            .unwrap();
        let urls: Vec<&str> = ds.all_links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://simonwillison.net/2024/", "https://openai.com/o1"]);
        assert_eq!(ds.all_links[1].text, "o1");
    }

    #[tokio::test]
    async fn test_url_override_is_used() {
        let config = PipelineConfig::default();
        let source = StaticSource::with(&[("https://mirror.example/post/", ARTICLE)]);
        let ds = run_year(
            2025,
            Some("https://mirror.example/post/"),
            &config,
            &engine(&config),
            &source,
        )
        .await
        .unwrap();
        assert_eq!(ds.source, "https://mirror.example/post/");
    }

    #[tokio::test]
    async fn test_markup_without_headings_is_parse_error() {
        let config = PipelineConfig::default();
        let source = StaticSource::with(&[(URL_2025, "<html><body><p>hi</p></body></html>")]);
        let err = run_year(2025, None, &config, &engine(&config), &source)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn test_batch_isolates_failed_year() {
        let config = PipelineConfig::default();
        let source = StaticSource::with(&[(URL_2025, ARTICLE)]);
        let results = run_batch(&[2026, 2025], None, &config, &engine(&config), &source).await;

        assert_eq!(results.len(), 2);
        let (year_a, result_a) = &results[0];
        assert_eq!(*year_a, 2026);
        let err = result_a.as_ref().unwrap_err();
        assert_eq!(err.kind(), "fetch");
        assert_eq!(err.attempted_urls().len(), 3);

        let (year_b, result_b) = &results[1];
        assert_eq!(*year_b, 2025);
        assert!(!result_b.as_ref().unwrap().events.is_empty());
    }

    #[tokio::test]
    async fn test_configured_themes_flow_into_events() {
        let mut config = PipelineConfig::default();
        config.themes.insert(2025, vec!["reasoning".to_string()]);
        let source = StaticSource::with(&[(URL_2025, ARTICLE)]);
        let ds = run_year(2025, None, &config, &engine(&config), &source)
            .await
            .unwrap();
        assert_eq!(ds.themes, vec!["reasoning"]);
        assert_eq!(ds.events[0].theme_refs, vec!["reasoning"]);
        assert!(ds.events[1].theme_refs.is_empty());
    }
}
