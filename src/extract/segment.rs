//! Splitting normalized blocks into candidate events.
//!
//! Each heading opens a section. A section whose body is longer than
//! `coarse_section_blocks` is split further: inside it, a paragraph or list
//! item carrying a link or a proper-noun phrase starts a new candidate once
//! the current one already has some body. Blocks before the first heading
//! only yield candidates from linked list items.
//!
//! The walk is a pure function of the blocks and the config, so identical
//! input always gives identical boundaries.

use super::mentions::{has_proper_noun, links_in_order, proper_noun_phrases};
use crate::config::SegmentConfig;
use crate::models::{Block, BlockKind};
use crate::utils::truncate_chars;

/// A provisional text span, before categorization.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub body: Vec<String>,
    /// Anchor targets and bare URLs, block by block in order of appearance.
    pub links: Vec<String>,
    pub first_block: usize,
}

impl Candidate {
    fn from_heading(block: &Block, config: &SegmentConfig) -> Self {
        Self {
            title: truncate_chars(&block.text, config.title_max_chars),
            body: Vec::new(),
            links: links_in_order(block),
            first_block: block.index,
        }
    }

    fn from_block(block: &Block, config: &SegmentConfig) -> Self {
        let mut candidate = Self {
            title: truncate_chars(&block_title(block), config.title_max_chars),
            body: Vec::new(),
            links: Vec::new(),
            first_block: block.index,
        };
        candidate.append(block);
        candidate
    }

    fn append(&mut self, block: &Block) {
        self.body.push(block.text.clone());
        self.links.extend(links_in_order(block));
    }

    pub fn body_text(&self) -> String {
        self.body.join(" ")
    }
}

/// Label for a candidate that starts at a body block.
///
/// Prefers the first link's anchor text, then the first proper-noun phrase,
/// then the block's first sentence.
fn block_title(block: &Block) -> String {
    if let Some(link) = block.links.iter().find(|l| !l.text.is_empty()) {
        return link.text.clone();
    }
    if let Some(phrase) = proper_noun_phrases(&block.text).first() {
        return phrase.to_string();
    }
    block
        .text
        .split_inclusive(['.', '!', '?'])
        .next()
        .unwrap_or(&block.text)
        .trim()
        .to_string()
}

fn is_boundary(block: &Block) -> bool {
    matches!(block.kind, BlockKind::Paragraph | BlockKind::ListItem)
        && (!block.links.is_empty() || has_proper_noun(&block.text))
}

struct Section<'a> {
    heading: Option<&'a Block>,
    body: Vec<&'a Block>,
}

fn sections(blocks: &[Block]) -> Vec<Section<'_>> {
    let mut out: Vec<Section<'_>> = Vec::new();
    for block in blocks {
        if block.kind.is_heading() {
            out.push(Section {
                heading: Some(block),
                body: Vec::new(),
            });
            continue;
        }
        match out.last_mut() {
            Some(section) => section.body.push(block),
            None => out.push(Section {
                heading: None,
                body: vec![block],
            }),
        }
    }
    out
}

/// Segment blocks into candidates, in source order.
pub fn segment(blocks: &[Block], config: &SegmentConfig) -> Vec<Candidate> {
    let mut out = Vec::new();
    for section in sections(blocks) {
        match section.heading {
            None => segment_headless(&section.body, config, &mut out),
            Some(heading) => segment_section(heading, &section.body, config, &mut out),
        }
    }
    // a heading followed directly by another heading carries no content
    out.retain(|c| !c.body.is_empty());
    out
}

fn segment_section(
    heading: &Block,
    body: &[&Block],
    config: &SegmentConfig,
    out: &mut Vec<Candidate>,
) {
    let coarse = body.len() > config.coarse_section_blocks;
    let mut current = Candidate::from_heading(heading, config);
    for block in body {
        if coarse && !current.body.is_empty() && is_boundary(block) {
            let next = Candidate::from_block(block, config);
            out.push(std::mem::replace(&mut current, next));
        } else {
            current.append(block);
        }
    }
    out.push(current);
}

fn segment_headless(body: &[&Block], config: &SegmentConfig, out: &mut Vec<Candidate>) {
    let mut current: Option<Candidate> = None;
    for block in body {
        if block.kind == BlockKind::ListItem && !block.links.is_empty() {
            if let Some(done) = current.replace(Candidate::from_block(block, config)) {
                out.push(done);
            }
        } else if let Some(c) = current.as_mut() {
            c.append(block);
        }
    }
    out.extend(current);
}
