//! Surface-level text cues: numeric tokens, bare URLs, proper-noun phrases
//! and month-name dates.

use crate::models::Block;
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;
use url::Url;

/// Currency amounts, percentages, parameter counts and version numbers, in
/// that priority at any given position.
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[$€£¥]\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:million|billion|trillion|[kKmMbB])\b)?",
        r"|\d+(?:\.\d+)?\s?%",
        r"|\b\d+(?:\.\d+)?[BMT]\b",
        r"|\d+(?:\.\d+)+",
    ))
    .unwrap()
});

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]]+"#).unwrap());

static PROPER_NOUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z0-9]*(?:[-.][A-Za-z0-9]+)*(?:\s+[A-Z][A-Za-z0-9]*(?:[-.][A-Za-z0-9]+)*)+")
        .unwrap()
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\b",
        r"(?:\s+(\d{1,2})(?:st|nd|rd|th)?\b)?",
        r"(?:,?\s+(\d{4})\b)?",
    ))
    .unwrap()
});

/// Count distinct numeric literals; a literal repeated verbatim counts once.
///
/// URLs are ignored so that ids and paths inside links do not count.
pub fn count_numeric_mentions(text: &str) -> usize {
    let without_urls = URL_RE.replace_all(text, " ");
    NUMERIC_RE
        .find_iter(&without_urls)
        .map(|m| m.as_str().trim())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Bare `http(s)://` URLs with their byte offsets, trailing punctuation
/// trimmed.
///
/// Each URL is normalized with [`Url::parse`] so it compares equal to the
/// same target taken from an anchor `href`.
pub fn bare_urls(text: &str) -> Vec<(usize, String)> {
    URL_RE
        .find_iter(text)
        .filter_map(|m| {
            let raw = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            if raw.len() <= "https://".len() {
                return None;
            }
            let url = Url::parse(raw).map_or_else(|_| raw.to_string(), |u| u.to_string());
            Some((m.start(), url))
        })
        .collect()
}

/// Every link target in `block`, in order of appearance.
///
/// An anchor sits where its text first occurs after the previous anchor; one
/// whose text cannot be found keeps its place right after that anchor. A
/// bare URL inside an anchor's text is the anchor itself and is not repeated.
pub fn links_in_order(block: &Block) -> Vec<String> {
    let text = block.text.as_str();
    let mut found: Vec<(usize, String)> = Vec::new();
    let mut anchor_spans: Vec<Range<usize>> = Vec::new();
    let mut cursor = 0;

    for link in &block.links {
        let start = if link.text.is_empty() {
            None
        } else {
            text[cursor..].find(link.text.as_str()).map(|i| cursor + i)
        };
        match start {
            Some(start) => {
                cursor = start + link.text.len();
                anchor_spans.push(start..cursor);
                found.push((start, link.url.clone()));
            }
            None => found.push((cursor, link.url.clone())),
        }
    }

    for (start, url) in bare_urls(text) {
        if anchor_spans.iter().any(|span| span.contains(&start)) {
            continue;
        }
        found.push((start, url));
    }

    // stable: an anchor keeps its place ahead of a bare URL at the same offset
    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, url)| url).unique().collect()
}

/// Capitalized multi-word phrases that do not open a sentence.
///
/// A phrase that does open a sentence still yields its remainder when that
/// remainder is itself multi-word ("Then Google Gemini" gives "Google Gemini").
pub fn proper_noun_phrases(text: &str) -> Vec<&str> {
    let mut phrases = Vec::new();
    for m in PROPER_NOUN_RE.find_iter(text) {
        if !at_sentence_start(text, m.start()) {
            phrases.push(m.as_str());
            continue;
        }
        let phrase = m.as_str();
        if let Some(split) = phrase.find(char::is_whitespace) {
            let rest = phrase[split..].trim_start();
            if rest.contains(char::is_whitespace) {
                phrases.push(rest);
            }
        }
    }
    phrases
}

pub fn has_proper_noun(text: &str) -> bool {
    !proper_noun_phrases(text).is_empty()
}

fn at_sentence_start(text: &str, start: usize) -> bool {
    match text[..start].trim_end().chars().last() {
        None => true,
        Some(c) => matches!(c, '.' | '!' | '?' | ':' | '"' | '“'),
    }
}

/// First month-name date in `text`, as `YYYY-MM-DD` or `YYYY-MM`.
///
/// A missing year defaults to `year`; an impossible day degrades to the month.
pub fn extract_date(text: &str, year: i32) -> Option<String> {
    let caps = DATE_RE.captures(text)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let found_year = caps
        .get(3)
        .and_then(|y| y.as_str().parse::<i32>().ok())
        .unwrap_or(year);
    let day = caps.get(2).and_then(|d| d.as_str().parse::<u32>().ok());

    if let Some(date) = day.and_then(|d| NaiveDate::from_ymd_opt(found_year, month, d)) {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    Some(format!("{found_year}-{month:02}"))
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    MONTHS.iter().position(|m| *m == name).map(|i| i as u32 + 1)
}
