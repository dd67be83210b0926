//! Ordered categorization rules.
//!
//! A [`RuleTable`] is an explicit list of `(category, cues)` pairs evaluated
//! top to bottom; the first rule with any matching cue wins. The order is
//! fixed: pricing, models, companies, research, concepts, tools. A text that
//! matches no rule gets no category and its candidate is discarded.

use crate::config::RuleKeywords;
use crate::models::Category;
use once_cell::sync::Lazy;
use regex::Regex;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[$€£¥]\s?\d|\b\d[\d,]*(?:\.\d+)?\s?(?:USD|dollars|cents)\b").unwrap()
});

/// Capitalized token with a version suffix: `GPT-4o`, `Claude 3.5`, `Qwen-2`.
static VERSIONED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z]+(?:-\d+(?:\.\d+)*[a-z]?|\s\d+(?:\.\d+)+)\b").unwrap()
});

static QUOTED_TERM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["“][A-Za-z][^"“”]{1,40}["”]"#).unwrap());

/// One piece of evidence for a category.
#[derive(Debug, Clone)]
pub enum Cue {
    /// Any of the listed words, whole-word and case-insensitive.
    Keywords(Regex),
    Currency,
    VersionedName,
    QuotedTerm,
}

impl Cue {
    /// Build a keyword cue; `None` for an empty list, which would match anything.
    pub fn keywords(words: &[String]) -> Result<Option<Cue>, regex::Error> {
        let words: Vec<String> = words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();
        if words.is_empty() {
            return Ok(None);
        }
        let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
        Ok(Some(Cue::Keywords(Regex::new(&pattern)?)))
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Cue::Keywords(re) => re.is_match(text),
            Cue::Currency => CURRENCY_RE.is_match(text),
            Cue::VersionedName => VERSIONED_NAME_RE.is_match(text),
            Cue::QuotedTerm => QUOTED_TERM_RE.is_match(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub category: Category,
    pub cues: Vec<Cue>,
}

impl Rule {
    pub fn matches(&self, text: &str) -> bool {
        self.cues.iter().any(|c| c.matches(text))
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// The standard six-rule table with keyword lists from configuration.
    pub fn from_keywords(k: &RuleKeywords) -> Result<Self, regex::Error> {
        let rule = |category, fixed: Vec<Cue>, lists: &[&Vec<String>]| -> Result<Rule, regex::Error> {
            let mut cues = fixed;
            for list in lists {
                cues.extend(Cue::keywords(list)?);
            }
            Ok(Rule { category, cues })
        };

        Ok(Self {
            rules: vec![
                rule(Category::Pricing, vec![Cue::Currency], &[&k.pricing])?,
                rule(
                    Category::Models,
                    vec![Cue::VersionedName],
                    &[&k.models, &k.model_families],
                )?,
                rule(Category::Companies, vec![], &[&k.companies, &k.company_verbs])?,
                rule(Category::Research, vec![], &[&k.research])?,
                rule(Category::Concepts, vec![Cue::QuotedTerm], &[&k.concepts])?,
                rule(Category::Tools, vec![], &[&k.tools])?,
            ],
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First matching category, or `None` when no rule applies.
    pub fn classify(&self, text: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|r| r.matches(text))
            .map(|r| r.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RuleTable {
        RuleTable::from_keywords(&RuleKeywords::default()).unwrap()
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let order: Vec<Category> = table().rules().iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Pricing,
                Category::Models,
                Category::Companies,
                Category::Research,
                Category::Concepts,
                Category::Tools,
            ]
        );
    }

    #[test]
    fn test_pricing_wins_over_models() {
        let text = "GPT-5 released OpenAI released GPT-5.1 with a 30% price cut";
        assert_eq!(table().classify(text), Some(Category::Pricing));
    }

    #[test]
    fn test_each_category_reachable() {
        let t = table();
        assert_eq!(t.classify("It costs $20 a month"), Some(Category::Pricing));
        assert_eq!(t.classify("Claude 3.5 Sonnet is great"), Some(Category::Models));
        assert_eq!(t.classify("Anthropic hired a lot"), Some(Category::Companies));
        assert_eq!(t.classify("A new paper on reasoning"), Some(Category::Research));
        assert_eq!(t.classify("People say \"vibe coding\" now"), Some(Category::Concepts));
        assert_eq!(t.classify("A handy CLI for this"), Some(Category::Tools));
    }

    #[test]
    fn test_unmatched_text_is_discarded() {
        assert_eq!(table().classify("a quiet afternoon with nothing going on"), None);
    }

    #[test]
    fn test_whole_word_matching() {
        // "frontier" must not trip the "tier" pricing keyword
        assert_eq!(table().classify("the frontier moved"), None);
        assert_eq!(table().classify("the free tier moved"), Some(Category::Pricing));
    }

    #[test]
    fn test_month_day_is_not_a_model_name() {
        assert_eq!(table().classify("on December 31 we slept"), None);
    }

    #[test]
    fn test_empty_keyword_lists_never_match() {
        let empty = RuleKeywords {
            pricing: vec![],
            models: vec![],
            model_families: vec![],
            companies: vec![],
            company_verbs: vec![],
            research: vec![],
            concepts: vec![" ".to_string()],
            tools: vec![],
        };
        let t = RuleTable::from_keywords(&empty).unwrap();
        assert_eq!(t.classify("plain words only"), None);
        assert_eq!(t.classify("costs $5"), Some(Category::Pricing));
    }
}
