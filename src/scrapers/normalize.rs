//! HTML normalization into structural blocks.
//!
//! The article body is located with the first configured content selector
//! that contains a heading. Inside it, headings, paragraphs and list items
//! are read in document order. Only content after the title heading and
//! before the first end marker is kept; navigation, comments and similar
//! chrome are skipped by tag or class.
//!
//! Boundary detection is heuristic and tolerant: a missing end marker keeps
//! everything to the end of the body, and unknown wrapper markup is ignored.

use crate::config::NormalizeConfig;
use crate::error::ParseError;
use crate::models::{Block, BlockKind, Link};
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static BLOCK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, p, li").unwrap());
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Tags whose contents never belong to the article text.
const SKIP_TAGS: &[&str] = &["nav", "footer", "aside", "form", "script", "style", "noscript"];

/// The article reduced to its title and ordered blocks.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Reduce `html` fetched from `url` to ordered blocks.
///
/// # Errors
///
/// - [`ParseError::MissingMarker`] if no content root with a heading exists
/// - [`ParseError::EmptyContent`] if nothing remains between title and end marker
#[instrument(level = "info", skip(html, config), fields(bytes = html.len()))]
pub fn normalize_document(
    html: &str,
    url: &str,
    config: &NormalizeConfig,
) -> Result<NormalizedDocument, ParseError> {
    let document = Html::parse_document(html);
    let base = Url::parse(url).ok();

    let root = find_content_root(&document, config).ok_or_else(|| ParseError::MissingMarker {
        url: url.to_string(),
        marker: "title heading (h1-h6) inside a content root".to_string(),
    })?;
    let root_id = root.id();

    let mut title: Option<String> = None;
    let mut blocks: Vec<Block> = Vec::new();

    for el in root.select(&BLOCK_SELECTOR) {
        let ancestors: Vec<&Element> = el
            .ancestors()
            .take_while(|n| n.id() != root_id)
            .filter_map(|n| n.value().as_element())
            .collect();

        if ancestors.iter().any(|a| has_class_in(a, &config.end_classes)) {
            if title.is_some() {
                debug!("Reached end-marker element");
                break;
            }
            continue;
        }
        if ancestors
            .iter()
            .any(|a| SKIP_TAGS.contains(&a.name()) || has_class_in(a, &config.boilerplate_classes))
        {
            continue;
        }
        // list item text already covers nested paragraphs and sub-items
        if ancestors.iter().any(|a| a.name() == "li") {
            continue;
        }

        let Some(kind) = block_kind(el.value().name()) else {
            continue;
        };
        let text = collapse_whitespace(&el.text().collect::<String>());
        if text.is_empty() {
            continue;
        }

        if title.is_none() {
            if kind.is_heading() {
                debug!(%text, "Found title heading");
                title = Some(text);
            }
            continue;
        }

        if config.end_markers.iter().any(|m| text.starts_with(m.as_str())) {
            debug!(%text, "Reached end-marker text");
            break;
        }

        blocks.push(Block {
            index: blocks.len(),
            kind,
            text,
            links: block_links(el, base.as_ref()),
        });
    }

    let title = title.ok_or_else(|| ParseError::MissingMarker {
        url: url.to_string(),
        marker: "title heading (h1-h6)".to_string(),
    })?;
    if blocks.is_empty() {
        return Err(ParseError::EmptyContent {
            url: url.to_string(),
        });
    }

    info!(
        %title,
        blocks = blocks.len(),
        headings = blocks.iter().filter(|b| b.kind.is_heading()).count(),
        "Normalized source article"
    );
    Ok(NormalizedDocument { title, blocks })
}

/// First configured selector match that contains at least one heading.
fn find_content_root<'a>(document: &'a Html, config: &NormalizeConfig) -> Option<ElementRef<'a>> {
    for raw in &config.content_selectors {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %raw, error = %e, "Skipping invalid content selector");
                continue;
            }
        };
        if let Some(root) = document
            .select(&selector)
            .find(|el| el.select(&HEADING_SELECTOR).next().is_some())
        {
            debug!(selector = %raw, "Selected content root");
            return Some(root);
        }
    }
    None
}

fn block_kind(tag: &str) -> Option<BlockKind> {
    match tag {
        "p" => Some(BlockKind::Paragraph),
        "li" => Some(BlockKind::ListItem),
        h if h.len() == 2 && h.starts_with('h') => h[1..].parse().ok().map(BlockKind::Heading),
        _ => None,
    }
}

fn has_class_in(el: &Element, classes: &[String]) -> bool {
    el.classes().any(|c| classes.iter().any(|k| k == c))
}

/// Anchor targets inside `el`, resolved against the page URL.
fn block_links(el: ElementRef<'_>, base: Option<&Url>) -> Vec<Link> {
    el.select(&ANCHOR_SELECTOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if href.is_empty() || href.starts_with('#') {
                return None;
            }
            let resolved = match base {
                Some(b) => b.join(href).ok()?,
                None => Url::parse(href).ok()?,
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                return None;
            }
            Some(Link {
                text: collapse_whitespace(&a.text().collect::<String>()),
                url: resolved.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://simonwillison.net/2025/Dec/31/the-year-in-llms/";

    const PAGE: &str = r#"<html><head><title>Page title</title></head><body>
<nav><ul><li><a href="/">Home</a></li></ul></nav>
<article>
  <h2>The year in LLMs</h2>
  <p>Intro with <a href="/2024/">last year</a>.</p>
  <h3>The year of reasoning</h3>
  <p>OpenAI released <a href="https://openai.com/o3">o3</a> in April.</p>
  <ul>
    <li>First <a href="https://a.example/x">thing</a>
      <ul><li>nested</li></ul>
    </li>
    <li><p>Para in item</p></li>
    <li><a href="mailto:me@example.com">mail</a> only</li>
  </ul>
  <div class="comments"><p>Great post!</p></div>
  <div class="entryFooter"><p>Posted 31st December 2025</p></div>
  <p>After the footer</p>
</article>
<footer><p>Copyright</p></footer>
</body></html>"#;

    fn normalize(html: &str) -> Result<NormalizedDocument, ParseError> {
        normalize_document(html, URL, &NormalizeConfig::default())
    }

    #[test]
    fn test_title_and_blocks_in_order() {
        let doc = normalize(PAGE).unwrap();
        assert_eq!(doc.title, "The year in LLMs");
        let texts: Vec<&str> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Intro with last year.",
                "The year of reasoning",
                "OpenAI released o3 in April.",
                "First thing nested",
                "Para in item",
                "mail only",
            ]
        );
        let indexes: Vec<usize> = doc.blocks.iter().map(|b| b.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_block_kinds() {
        let doc = normalize(PAGE).unwrap();
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[1].kind, BlockKind::Heading(3));
        assert_eq!(doc.blocks[3].kind, BlockKind::ListItem);
    }

    #[test]
    fn test_links_resolved_and_filtered() {
        let doc = normalize(PAGE).unwrap();
        assert_eq!(
            doc.blocks[0].links,
            vec![Link {
                text: "last year".to_string(),
                url: "https://simonwillison.net/2024/".to_string(),
            }]
        );
        assert_eq!(doc.blocks[2].links[0].url, "https://openai.com/o3");
        assert!(doc.blocks[5].links.is_empty());
    }

    #[test]
    fn test_chrome_and_trailer_dropped() {
        let doc = normalize(PAGE).unwrap();
        let all: String = doc.blocks.iter().map(|b| b.text.clone()).collect();
        assert!(!all.contains("Home"));
        assert!(!all.contains("Great post"));
        assert!(!all.contains("Posted"));
        assert!(!all.contains("After the footer"));
        assert!(!all.contains("Copyright"));
    }

    #[test]
    fn test_end_marker_text_without_footer_class() {
        let html = r#"<html><body><article>
  <h1>Title</h1><p>Body one</p><p>Tags: llms, ai</p><p>Body two</p>
</article></body></html>"#;
        let doc = normalize(html).unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text, "Body one");
    }

    #[test]
    fn test_falls_back_to_body_without_article() {
        let html = "<html><body><div><h1>Title</h1><p>Body</p></div></body></html>";
        let doc = normalize(html).unwrap();
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_no_headings_is_parse_error() {
        let html = "<html><body><article><p>Just text</p></article></body></html>";
        let err = normalize(html).unwrap_err();
        match err {
            ParseError::MissingMarker { marker, .. } => assert!(marker.contains("title heading")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_title_only_is_empty_content() {
        let html = "<html><body><article><h1>Title</h1></article></body></html>";
        assert!(matches!(normalize(html), Err(ParseError::EmptyContent { .. })));
    }
}
