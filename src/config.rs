//! Pipeline configuration.
//!
//! All heuristics that need periodic tuning live here: source URL patterns,
//! boundary markers for normalization, category keyword lists, scoring
//! weights and theme lists. Every field has a default, so a YAML file only
//! needs to override what it changes:
//!
//! ```yaml
//! scoring:
//!   link: 0.75
//!   category_weights:
//!     pricing: 3.0
//! themes:
//!   2025: ["agents", "reasoning", "vibe coding"]
//! ```

use crate::error::ConfigError;
use crate::models::Category;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub normalize: NormalizeConfig,
    pub segment: SegmentConfig,
    pub rules: RuleKeywords,
    pub scoring: ScoringWeights,
    /// Used for any year without an entry in `themes`.
    pub default_themes: Vec<String>,
    pub themes: BTreeMap<i32, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            normalize: NormalizeConfig::default(),
            segment: SegmentConfig::default(),
            rules: RuleKeywords::default(),
            scoring: ScoringWeights::default(),
            default_themes: strings(&[
                "agents",
                "reasoning",
                "open weights",
                "coding",
                "multimodal",
                "local models",
                "prompt injection",
            ]),
            themes: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Load from a YAML file, or fall back to defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = match path {
            None => {
                info!("No config file given; using built-in defaults");
                Self::default()
            }
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| {
                    ConfigError::Read {
                        path: path.to_string(),
                        source,
                    }
                })?;
                let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_string(),
                    source,
                })?;
                info!(path, "Loaded configuration");
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Reject weights that would break score monotonicity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        let mut named = vec![
            ("scoring.category", s.category),
            ("scoring.link", s.link),
            ("scoring.numeric", s.numeric),
            ("scoring.theme", s.theme),
        ];
        for c in Category::ALL {
            named.push((c.as_str(), s.category_weights.get(c)));
        }
        for (name, w) in named {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "weight {name} must be finite and non-negative, got {w}"
                )));
            }
        }
        if self.source.slug_variants.is_empty() && self.source.known_urls.is_empty() {
            return Err(ConfigError::Invalid(
                "source needs at least one slug variant or known URL".to_string(),
            ));
        }
        Ok(())
    }

    /// Themes for `year`, falling back to `default_themes`.
    pub fn themes_for(&self, year: i32) -> Vec<String> {
        self.themes
            .get(&year)
            .cloned()
            .unwrap_or_else(|| self.default_themes.clone())
    }
}

/// Where the yearly article lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub site: String,
    pub month: String,
    pub day: u8,
    /// Slug templates; `{year}` is substituted.
    pub slug_variants: Vec<String>,
    /// Exact URLs for years whose post is already known.
    pub known_urls: BTreeMap<i32, String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Cap on HEAD requests when verifying links.
    pub verify_limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let known_urls = BTreeMap::from([
            (2023, "https://simonwillison.net/2023/Dec/31/ai-in-2023/".to_string()),
            (2024, "https://simonwillison.net/2024/Dec/31/llms-in-2024/".to_string()),
            (2025, "https://simonwillison.net/2025/Dec/31/the-year-in-llms/".to_string()),
        ]);
        Self {
            site: "https://simonwillison.net".to_string(),
            month: "Dec".to_string(),
            day: 31,
            slug_variants: strings(&["the-year-in-llms", "llms-in-{year}", "ai-in-{year}"]),
            known_urls,
            timeout_secs: 30,
            user_agent: concat!("llm_timeline/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_limit: 50,
        }
    }
}

/// Boundary heuristics for stripping page chrome.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// CSS selectors tried in order to find the article body.
    pub content_selectors: Vec<String>,
    /// Elements with these classes (or inside them) are skipped.
    pub boilerplate_classes: Vec<String>,
    /// Elements with these classes end the article.
    pub end_classes: Vec<String>,
    /// Blocks whose text starts with one of these end the article.
    pub end_markers: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            content_selectors: strings(&["article", "div.entry-content", "div.entry", "main", "body"]),
            boilerplate_classes: strings(&["comments", "sidebar", "breadcrumbs", "metabox"]),
            end_classes: strings(&["entryFooter", "recent-articles", "entry-footer"]),
            end_markers: strings(&["Posted ", "More recent articles", "Tags:", "Previous:"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// A section with more body blocks than this is split further.
    pub coarse_section_blocks: usize,
    pub title_max_chars: usize,
    pub description_max_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            coarse_section_blocks: 4,
            title_max_chars: 80,
            description_max_chars: 300,
        }
    }
}

/// Keyword lists for the ordered categorization rules.
///
/// Matching is case-insensitive and on whole words. The structural cues
/// (currency amounts, versioned model names, quoted terms) are fixed
/// patterns and not part of this table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleKeywords {
    pub pricing: Vec<String>,
    pub models: Vec<String>,
    pub model_families: Vec<String>,
    pub companies: Vec<String>,
    pub company_verbs: Vec<String>,
    pub research: Vec<String>,
    pub concepts: Vec<String>,
    pub tools: Vec<String>,
}

impl Default for RuleKeywords {
    fn default() -> Self {
        Self {
            pricing: strings(&[
                "per token",
                "per million tokens",
                "subscription",
                "subscriptions",
                "tier",
                "tiers",
                "price",
                "prices",
                "pricing",
                "cheaper",
                "cost",
                "costs",
            ]),
            models: strings(&[
                "model",
                "models",
                "release",
                "released",
                "releases",
                "parameter",
                "parameters",
                "weights",
            ]),
            model_families: strings(&[
                "gpt", "claude", "llama", "gemini", "mistral", "qwen", "deepseek", "phi", "gemma",
            ]),
            companies: strings(&[
                "openai",
                "anthropic",
                "google",
                "meta",
                "microsoft",
                "alibaba",
                "amazon",
                "nvidia",
                "apple",
                "xai",
            ]),
            company_verbs: strings(&["announced", "acquired", "raised", "funding", "valuation"]),
            research: strings(&[
                "paper",
                "papers",
                "benchmark",
                "benchmarks",
                "arxiv",
                "competition",
                "olympiad",
                "leaderboard",
                "study",
                "research",
            ]),
            concepts: strings(&["coined", "term", "concept", "paradigm", "pattern", "definition"]),
            tools: strings(&[
                "tool",
                "tools",
                "cli",
                "api",
                "apis",
                "sdk",
                "library",
                "plugin",
                "extension",
                "app",
                "software",
                "command-line",
                "open source",
                "github",
            ]),
        }
    }
}

/// Weights for `impactScore = w1*categoryWeight + w2*links + w3*numeric + w4*themes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// `w1`
    pub category: f64,
    /// `w2`
    pub link: f64,
    /// `w3`
    pub numeric: f64,
    /// `w4`
    pub theme: f64,
    pub category_weights: CategoryWeights,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category: 1.0,
            link: 0.5,
            numeric: 0.25,
            theme: 0.75,
            category_weights: CategoryWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub models: f64,
    pub tools: f64,
    pub concepts: f64,
    pub companies: f64,
    pub research: f64,
    pub pricing: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            models: 3.0,
            tools: 2.0,
            concepts: 1.5,
            companies: 2.0,
            research: 2.0,
            pricing: 2.5,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Models => self.models,
            Category::Tools => self.tools,
            Category::Concepts => self.concepts,
            Category::Companies => self.companies,
            Category::Research => self.research,
            Category::Pricing => self.pricing,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.segment.description_max_chars, 300);
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.source.known_urls.len(), 3);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
scoring:
  link: 2.0
  category_weights:
    pricing: 9.0
themes:
  2025: ["agents", "vibe coding"]
"#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.scoring.link, 2.0);
        assert_eq!(config.scoring.numeric, 0.25);
        assert_eq!(config.scoring.category_weights.get(Category::Pricing), 9.0);
        assert_eq!(config.scoring.category_weights.get(Category::Models), 3.0);
        assert_eq!(config.themes_for(2025), vec!["agents", "vibe coding"]);
        assert_eq!(config.themes_for(2024), config.default_themes);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = PipelineConfig::from_yaml("scoring:\n  numeric: -1.0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scoring.numeric"));
    }

    #[test]
    fn test_negative_category_weight_rejected() {
        let config =
            PipelineConfig::from_yaml("scoring:\n  category_weights:\n    tools: -0.5\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tools"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "segment:\n  coarse_section_blocks: 2").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.segment.coarse_section_blocks, 2);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = PipelineConfig::load(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_none_uses_defaults() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config.source.site, "https://simonwillison.net");
    }
}
