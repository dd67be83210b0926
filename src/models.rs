//! Data models shared by the fetcher, the extraction engine and the writers.
//!
//! - [`Block`]: one normalized structural unit of the source article
//! - [`Event`]: a categorized, scored happening extracted from blocks
//! - [`YearDataset`]: the complete output for one year's article
//! - [`YearReport`]: per-year outcome of a batch run
//!
//! Serialized field names are camelCase to match what the visualization
//! layer reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural kind of a normalized block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "level", rename_all = "camelCase")]
pub enum BlockKind {
    /// `h1`..`h6`, carrying the level.
    Heading(u8),
    Paragraph,
    ListItem,
}

impl BlockKind {
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading(_))
    }
}

/// A hyperlink embedded in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// One heading, paragraph or list item with markup stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the normalized sequence, starting at 0.
    pub index: usize,
    pub kind: BlockKind,
    pub text: String,
    pub links: Vec<Link>,
}

/// The fixed six-member taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Models,
    Tools,
    Concepts,
    Companies,
    Research,
    Pricing,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Models,
        Category::Tools,
        Category::Concepts,
        Category::Companies,
        Category::Research,
        Category::Pricing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Models => "models",
            Category::Tools => "tools",
            Category::Concepts => "concepts",
            Category::Companies => "companies",
            Category::Research => "research",
            Category::Pricing => "pricing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single discrete happening extracted from the article.
///
/// `impact_score` is derived from the other attributes at construction time
/// and is only readable through [`Event::impact_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Approximate place within the year, in `[0, 1)`.
    pub position: f64,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub links: Vec<String>,
    pub numeric_mentions: usize,
    pub theme_refs: Vec<String>,
    impact_score: f64,
}

/// Everything about an event except its score.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub id: String,
    pub date: Option<String>,
    pub position: f64,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub links: Vec<String>,
    pub numeric_mentions: usize,
    pub theme_refs: Vec<String>,
}

impl Event {
    /// Finalize a draft, computing its score with `score`.
    pub fn from_draft(draft: EventDraft, score: impl FnOnce(&EventDraft) -> f64) -> Self {
        let impact_score = score(&draft);
        Self {
            id: draft.id,
            date: draft.date,
            position: draft.position,
            category: draft.category,
            title: draft.title,
            description: draft.description,
            links: draft.links,
            numeric_mentions: draft.numeric_mentions,
            theme_refs: draft.theme_refs,
            impact_score,
        }
    }

    pub fn impact_score(&self) -> f64 {
        self.impact_score
    }
}

/// Result of a HEAD check against one event link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheck {
    pub url: String,
    pub status: Option<u16>,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The complete structured output for one year's article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearDataset {
    pub year: i32,
    pub source: String,
    pub title: String,
    /// RFC 3339 time the source article was fetched.
    #[serde(default)]
    pub scraped_at: String,
    /// Chronological order of appearance in the source.
    pub events: Vec<Event>,
    pub themes: Vec<String>,
    /// Every anchor in the article body that has text, in document order.
    #[serde(default)]
    pub all_links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_verification: Option<Vec<LinkCheck>>,
}

impl YearDataset {
    /// Events by descending impact score; equal scores keep source order.
    pub fn ranked(&self) -> Vec<&Event> {
        let mut ranked: Vec<&Event> = self.events.iter().collect();
        // sort_by is stable, so ties stay chronological
        ranked.sort_by(|a, b| b.impact_score().total_cmp(&a.impact_score()));
        ranked
    }

    /// Number of events in `category`.
    pub fn count_in(&self, category: Category) -> usize {
        self.events.iter().filter(|e| e.category == category).count()
    }

    pub fn link_count(&self) -> usize {
        self.events.iter().map(|e| e.links.len()).sum()
    }
}

/// Outcome of one requested year in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearReport {
    pub year: i32,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_urls: Vec<String>,
}

impl YearReport {
    pub fn success(dataset: &YearDataset) -> Self {
        Self {
            year: dataset.year,
            ok: true,
            event_count: Some(dataset.events.len()),
            error_kind: None,
            error: None,
            attempted_urls: Vec::new(),
        }
    }

    pub fn failure(year: i32, err: &crate::error::YearError) -> Self {
        Self {
            year,
            ok: false,
            event_count: None,
            error_kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
            attempted_urls: err.attempted_urls(),
        }
    }
}
