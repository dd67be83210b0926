//! Theme matching and impact scoring.

use crate::config::ScoringWeights;
use crate::models::EventDraft;
use itertools::Itertools;

/// Themes whose text appears, case-insensitively, somewhere in `text`.
///
/// Keeps the order of `themes`. Blank themes never match.
pub fn match_themes(text: &str, themes: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    themes
        .iter()
        .filter(|t| !t.trim().is_empty() && haystack.contains(&t.to_lowercase()))
        .unique()
        .cloned()
        .collect()
}

/// `w1*categoryWeight + w2*links + w3*numericMentions + w4*themeRefs`
pub fn impact_score(weights: &ScoringWeights, draft: &EventDraft) -> f64 {
    weights.category * weights.category_weights.get(draft.category)
        + weights.link * draft.links.len() as f64
        + weights.numeric * draft.numeric_mentions as f64
        + weights.theme * draft.theme_refs.len() as f64
}
