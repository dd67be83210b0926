//! Timeline index for the visualization layer.
//!
//! The visualization derives its year tabs, default sort and category
//! filters from the emitted datasets. `timeline_index.json` holds those
//! values, computed once from the datasets on disk:
//!
//! - available years and the latest year
//! - the category taxonomy, for filter buttons
//! - per-year category counts and link totals, for the charts
//! - the pricing-event time series
//! - top-ranked event ids per year (score descending, ties chronological)
//! - the outcome of every year requested in the last batch
//!
//! Datasets on disk may predate the last batch. A year that failed in the
//! batch but still has a dataset from an earlier run is listed in
//! `staleYears`: its entries describe the older article fetch, not this run.

use crate::models::{Category, YearDataset, YearReport};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const INDEX_FILE: &str = "timeline_index.json";
const TOP_EVENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineIndex {
    pub generated_at: String,
    pub years: Vec<i32>,
    pub latest_year: Option<i32>,
    pub categories: Vec<Category>,
    pub category_counts: BTreeMap<i32, BTreeMap<Category, usize>>,
    pub link_counts: BTreeMap<i32, usize>,
    pub pricing_series: Vec<PricingPoint>,
    pub top_events: BTreeMap<i32, Vec<String>>,
    pub batch: Vec<YearReport>,
    /// Years served from an earlier run because the last batch failed them.
    pub stale_years: Vec<i32>,
}

/// One pricing event placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPoint {
    pub year: i32,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub position: f64,
    pub impact_score: f64,
}

/// Build the index from every emitted dataset and the latest batch outcome.
pub fn build_index(
    datasets: &BTreeMap<i32, YearDataset>,
    batch: Vec<YearReport>,
    generated_at: String,
) -> TimelineIndex {
    let years: Vec<i32> = datasets.keys().copied().collect();

    let category_counts: BTreeMap<i32, BTreeMap<Category, usize>> = datasets
        .iter()
        .map(|(year, ds)| {
            let counts: BTreeMap<Category, usize> =
                Category::ALL.iter().map(|c| (*c, ds.count_in(*c))).collect();
            (*year, counts)
        })
        .collect();

    let link_counts: BTreeMap<i32, usize> = datasets
        .iter()
        .map(|(year, ds)| (*year, ds.link_count()))
        .collect();

    let pricing_series: Vec<PricingPoint> = datasets
        .values()
        .flat_map(|ds| {
            ds.events
                .iter()
                .filter(|e| e.category == Category::Pricing)
                .map(move |e| PricingPoint {
                    year: ds.year,
                    event_id: e.id.clone(),
                    date: e.date.clone(),
                    position: e.position,
                    impact_score: e.impact_score(),
                })
        })
        .collect();

    let top_events: BTreeMap<i32, Vec<String>> = datasets
        .iter()
        .map(|(year, ds)| {
            let ids: Vec<String> = ds
                .ranked()
                .into_iter()
                .take(TOP_EVENTS)
                .map(|e| e.id.clone())
                .collect();
            (*year, ids)
        })
        .collect();

    let stale_years: Vec<i32> = batch
        .iter()
        .filter(|r| !r.ok && datasets.contains_key(&r.year))
        .map(|r| r.year)
        .sorted()
        .dedup()
        .collect();

    TimelineIndex {
        generated_at,
        latest_year: years.last().copied(),
        years,
        categories: Category::ALL.to_vec(),
        category_counts,
        link_counts,
        pricing_series,
        top_events,
        batch,
        stale_years,
    }
}

#[instrument(level = "info", skip_all, fields(%output_dir, years = index.years.len()))]
pub async fn write_index(index: &TimelineIndex, output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(index)?;
    let path = Path::new(output_dir).join(INDEX_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), latest_year = ?index.latest_year, "Wrote timeline index");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, YearError};
    use crate::models::{Event, EventDraft};

    fn event(id: &str, category: Category, links: usize, score: f64) -> Event {
        Event::from_draft(
            EventDraft {
                id: id.to_string(),
                date: None,
                position: 0.25,
                category,
                title: id.to_string(),
                description: String::new(),
                links: (0..links).map(|i| format!("https://l/{i}")).collect(),
                numeric_mentions: 0,
                theme_refs: vec![],
            },
            |_| score,
        )
    }

    fn dataset(year: i32, events: Vec<Event>) -> YearDataset {
        YearDataset {
            year,
            source: String::new(),
            title: String::new(),
            scraped_at: String::new(),
            events,
            themes: vec![],
            all_links: vec![],
            link_verification: None,
        }
    }

    fn sample() -> BTreeMap<i32, YearDataset> {
        BTreeMap::from([
            (
                2025,
                dataset(
                    2025,
                    vec![
                        event("a", Category::Models, 2, 4.0),
                        event("b", Category::Pricing, 1, 4.0),
                        event("c", Category::Pricing, 0, 6.0),
                    ],
                ),
            ),
            (2023, dataset(2023, vec![event("d", Category::Tools, 3, 1.0)])),
        ])
    }

    #[test]
    fn test_years_and_latest_derived_from_datasets() {
        let index = build_index(&sample(), vec![], "now".to_string());
        assert_eq!(index.years, vec![2023, 2025]);
        assert_eq!(index.latest_year, Some(2025));
        assert_eq!(index.categories.len(), 6);
    }

    #[test]
    fn test_counts_and_series() {
        let index = build_index(&sample(), vec![], "now".to_string());
        assert_eq!(index.category_counts[&2025][&Category::Pricing], 2);
        assert_eq!(index.category_counts[&2025][&Category::Concepts], 0);
        assert_eq!(index.link_counts[&2025], 3);
        assert_eq!(index.link_counts[&2023], 3);
        let ids: Vec<&str> = index.pricing_series.iter().map(|p| p.event_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_top_events_ranked_with_stable_ties() {
        let index = build_index(&sample(), vec![], "now".to_string());
        assert_eq!(index.top_events[&2025], vec!["c", "a", "b"]);
    }

    #[test]
    fn test_failed_year_with_old_dataset_is_stale() {
        let failed: YearError = FetchError { year: 2025, attempts: vec![] }.into();
        let batch = vec![
            YearReport::failure(2025, &failed),
            YearReport::success(&sample()[&2023]),
            YearReport::failure(2026, &failed),
        ];
        let index = build_index(&sample(), batch, "now".to_string());
        assert_eq!(index.stale_years, vec![2025]);
        assert_eq!(index.years, vec![2023, 2025]);
    }

    #[test]
    fn test_empty_collection() {
        let index = build_index(&BTreeMap::new(), vec![], "now".to_string());
        assert!(index.years.is_empty());
        assert_eq!(index.latest_year, None);
    }

    #[tokio::test]
    async fn test_write_index_includes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let err: YearError = FetchError { year: 2026, attempts: vec![] }.into();
        let index = build_index(&sample(), vec![YearReport::failure(2026, &err)], "now".to_string());
        let path = write_index(&index, out).await.unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"latestYear\": 2025"));
        assert!(raw.contains("\"errorKind\": \"fetch\""));
        assert!(raw.contains("\"staleYears\": []"));
        let back: TimelineIndex = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, index);
    }
}
