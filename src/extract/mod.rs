//! Event extraction and scoring.
//!
//! Turns normalized blocks into scored, categorized [`Event`]s:
//!
//! 1. [`segment`]: blocks → candidates (deterministic boundaries)
//! 2. [`categorize`]: candidate text → one taxonomy category, or discard
//! 3. [`mentions`]: links, numeric tokens and dates from the candidate span
//! 4. [`score`]: theme matches and the impact score
//!
//! The [`Engine`] holds only read-only state built from configuration, so
//! one instance can serve every year of a batch without leaking state
//! between them.

pub mod categorize;
pub mod mentions;
pub mod score;
pub mod segment;

use crate::config::{PipelineConfig, ScoringWeights, SegmentConfig};
use crate::error::{ConfigError, ExtractionError};
use crate::models::{Block, Event, EventDraft};
use crate::utils::{slugify_title, truncate_chars};
use categorize::RuleTable;
use itertools::Itertools;
use mentions::{count_numeric_mentions, extract_date};
use score::{impact_score, match_themes};
use segment::segment;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct Engine {
    rules: RuleTable,
    segment: SegmentConfig,
    scoring: ScoringWeights,
}

impl Engine {
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let rules = RuleTable::from_keywords(&config.rules)
            .map_err(|e| ConfigError::Invalid(format!("keyword rules: {e}")))?;
        Ok(Self {
            rules,
            segment: config.segment.clone(),
            scoring: config.scoring.clone(),
        })
    }

    /// Extract events from `blocks`, in segmentation order.
    ///
    /// # Errors
    ///
    /// [`ExtractionError`] when no candidate survives categorization.
    #[instrument(level = "info", skip(self, blocks, themes), fields(blocks = blocks.len()))]
    pub fn extract(
        &self,
        year: i32,
        blocks: &[Block],
        themes: &[String],
    ) -> Result<Vec<Event>, ExtractionError> {
        let candidates = segment(blocks, &self.segment);
        let total_blocks = blocks.len().max(1) as f64;
        let mut used_ids = HashSet::new();
        let mut events = Vec::new();

        for candidate in &candidates {
            // every text-derived attribute is read from what the event carries
            let description =
                truncate_chars(&candidate.body_text(), self.segment.description_max_chars);
            let text = format!("{} {}", candidate.title, description);
            let Some(category) = self.rules.classify(&text) else {
                debug!(title = %candidate.title, "Discarding candidate with no matching rule");
                continue;
            };

            let draft = EventDraft {
                id: unique_id(&candidate.title, &mut used_ids),
                date: extract_date(&text, year),
                position: round3(candidate.first_block as f64 / total_blocks),
                category,
                title: candidate.title.clone(),
                description,
                links: candidate.links.iter().unique().cloned().collect(),
                numeric_mentions: count_numeric_mentions(&text),
                theme_refs: match_themes(&text, themes),
            };
            debug!(id = %draft.id, %category, "Extracted event");
            events.push(Event::from_draft(draft, |d| impact_score(&self.scoring, d)));
        }

        if events.is_empty() {
            return Err(ExtractionError {
                year,
                blocks: blocks.len(),
                candidates: candidates.len(),
            });
        }
        info!(
            candidates = candidates.len(),
            events = events.len(),
            discarded = candidates.len() - events.len(),
            "Extracted events"
        );
        Ok(events)
    }
}

/// Slug of `title`, suffixed `-2`, `-3`... until unused.
fn unique_id(title: &str, used: &mut HashSet<String>) -> String {
    let mut base = slugify_title(title);
    if base.is_empty() {
        base = "event".to_string();
    }
    let mut id = base.clone();
    let mut n = 2;
    while used.contains(&id) {
        id = format!("{base}-{n}");
        n += 1;
    }
    used.insert(id.clone());
    id
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
