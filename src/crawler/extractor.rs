//! HTML extractor producing structured page content
//!
//! This module turns a fetched HTML document into an [`ExtractedPage`]:
//! - Title and meta description
//! - Headings (h1-h4) with their document position
//! - Paragraphs longer than 20 characters
//! - Ordered and unordered lists
//! - Same-site links with surrounding context
//! - Forms with at least one named input
//! - Candidate step-by-step instructions
//!
//! `script`, `style`, `nav`, `footer` and `header` elements are detached
//! from the tree before anything is captured.

use crate::crawler::page::{
    ContentList, ExtractedPage, FormInput, Heading, ListKind, PageForm, PageLink,
};
use crate::url::is_same_site;
use crate::ExtractionError;
use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Elements whose text never counts as page content
const STRIPPED_ELEMENTS: &str = "script, style, nav, footer, header";

/// Punctuation kept by [`clean_text`] besides word characters and whitespace
const ALLOWED_PUNCTUATION: &str = "-.,;:!?()[]{}@#$%&*+=<>/\\|`~'\"₱";

/// Paragraphs must be longer than this many characters
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Maximum characters of enclosing text kept as link context
const MAX_LINK_CONTEXT_CHARS: usize = 200;

static STEP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)step\s*\d+",
        r"^\d+\.",
        r"(?i)first|second|third|then|next|finally",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// Normalizes captured text
///
/// Characters outside word characters, whitespace and [`ALLOWED_PUNCTUATION`]
/// become spaces, then whitespace runs collapse to a single space. Lossy but
/// deterministic; every piece of captured text goes through it.
///
/// # Example
///
/// ```
/// use site_digest::crawler::clean_text;
///
/// assert_eq!(clean_text("  Fees:\n\t₱50,000 « per year »  "), "Fees: ₱50,000 per year");
/// ```
pub fn clean_text(text: &str) -> String {
    let filtered: String = text
        .chars()
        .map(|c| if is_allowed_char(c) { c } else { ' ' })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(c)
}

/// Checks a cleaned line against the step heuristics
///
/// Over-matching ordinary prose ("first", "next") is expected.
pub fn looks_like_step(text: &str) -> bool {
    STEP_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

/// Extracts structured content from an HTML document
///
/// # Arguments
///
/// * `html` - The raw response body
/// * `source_url` - The URL the body was fetched from; relative links resolve
///   against it and only links on the same site are kept
///
/// # Returns
///
/// * `Ok(ExtractedPage)` - The page, with a relevance score of 0 until scored
/// * `Err(ExtractionError)` - The source URL is invalid or the body is blank
///
/// # Example
///
/// ```
/// use site_digest::crawler::extract;
///
/// let html = br#"<html><head><title>Apply</title></head><body>
///     <h1>Admissions</h1><a href="/apply">Apply online</a></body></html>"#;
/// let page = extract(html, "https://example.com/").unwrap();
/// assert_eq!(page.title, "Apply");
/// assert_eq!(page.links[0].url, "https://example.com/apply");
/// ```
pub fn extract(html: &[u8], source_url: &str) -> Result<ExtractedPage, ExtractionError> {
    let base_url = Url::parse(source_url).map_err(|e| ExtractionError::InvalidSourceUrl {
        url: source_url.to_string(),
        message: e.to_string(),
    })?;

    let body = String::from_utf8_lossy(html);
    if body.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument {
            url: source_url.to_string(),
        });
    }

    let mut document = Html::parse_document(&body);
    strip_non_content(&mut document)?;

    // Detached subtrees are only unreachable when walking from the root
    let root = document.root_element();

    Ok(ExtractedPage {
        url: source_url.to_string(),
        title: extract_title(root)?,
        description: extract_description(root)?,
        headings: extract_headings(root)?,
        paragraphs: extract_paragraphs(root)?,
        lists: extract_lists(root)?,
        links: extract_links(root, &base_url)?,
        forms: extract_forms(root)?,
        steps: extract_steps(root)?,
        relevance_score: 0.0,
        fetched_at: Utc::now(),
    })
}

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Detaches non-content elements from the document tree
fn strip_non_content(document: &mut Html) -> Result<(), ExtractionError> {
    let stripped = selector(STRIPPED_ELEMENTS)?;
    let ids: Vec<_> = document
        .root_element()
        .select(&stripped)
        .map(|element| element.id())
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    Ok(())
}

fn extract_title(root: ElementRef) -> Result<String, ExtractionError> {
    let title = selector("title")?;
    Ok(root
        .select(&title)
        .next()
        .map(element_text)
        .unwrap_or_default())
}

fn extract_description(root: ElementRef) -> Result<String, ExtractionError> {
    let meta = selector(r#"meta[name="description"]"#)?;
    Ok(root
        .select(&meta)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(clean_text)
        .unwrap_or_default())
}

fn extract_headings(root: ElementRef) -> Result<Vec<Heading>, ExtractionError> {
    let headings = selector("h1, h2, h3, h4")?;
    let mut captured = Vec::new();

    for element in root.select(&headings) {
        let text = element_text(element);
        if text.is_empty() {
            continue;
        }

        let level = element.value().name()[1..].parse::<u8>().unwrap_or(4);
        captured.push(Heading {
            level,
            text,
            order: captured.len(),
        });
    }

    Ok(captured)
}

fn extract_paragraphs(root: ElementRef) -> Result<Vec<String>, ExtractionError> {
    let paragraphs = selector("p")?;
    Ok(root
        .select(&paragraphs)
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect())
}

fn extract_lists(root: ElementRef) -> Result<Vec<ContentList>, ExtractionError> {
    let lists = selector("ul, ol")?;
    let items = selector("li")?;
    let mut captured = Vec::new();

    for list in root.select(&lists) {
        let list_items: Vec<String> = list
            .select(&items)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();

        if list_items.is_empty() {
            continue;
        }

        let kind = if list.value().name() == "ol" {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        };
        captured.push(ContentList {
            kind,
            items: list_items,
        });
    }

    Ok(captured)
}

/// Extracts same-site links that carry visible text
fn extract_links(root: ElementRef, base_url: &Url) -> Result<Vec<PageLink>, ExtractionError> {
    let anchors = selector("a[href]")?;
    let mut links = Vec::new();

    for anchor in root.select(&anchors) {
        let text = element_text(anchor);
        if text.is_empty() {
            continue;
        }

        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        else {
            continue;
        };

        if !is_same_site(&url, base_url) {
            continue;
        }

        links.push(PageLink {
            url: url.to_string(),
            text,
            context: link_context(anchor),
        });
    }

    Ok(links)
}

/// Text of the element immediately enclosing a link, truncated
fn link_context(anchor: ElementRef) -> String {
    anchor
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| {
            element_text(parent)
                .chars()
                .take(MAX_LINK_CONTEXT_CHARS)
                .collect()
        })
        .unwrap_or_default()
}

/// Resolves a link href to an absolute HTTP(S) URL without fragment
///
/// Returns None for `javascript:`, `mailto:`, `tel:` and `data:` links,
/// fragment-only anchors and anything that fails to resolve.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url)
}

fn extract_forms(root: ElementRef) -> Result<Vec<PageForm>, ExtractionError> {
    let forms = selector("form")?;
    let fields = selector("input, textarea, select")?;
    let mut captured = Vec::new();

    for form in root.select(&forms) {
        let inputs: Vec<FormInput> = form
            .select(&fields)
            .filter_map(|field| {
                let element = field.value();
                let name = element.attr("name")?;
                Some(FormInput {
                    name: name.to_string(),
                    input_type: element.attr("type").unwrap_or("text").to_string(),
                    required: element.attr("required").is_some(),
                })
            })
            .collect();

        if inputs.is_empty() {
            continue;
        }

        captured.push(PageForm {
            action: form.value().attr("action").unwrap_or("").to_string(),
            method: form.value().attr("method").unwrap_or("get").to_string(),
            inputs,
        });
    }

    Ok(captured)
}

fn extract_steps(root: ElementRef) -> Result<Vec<String>, ExtractionError> {
    let candidates = selector("li, p, div")?;
    Ok(root
        .select(&candidates)
        .map(element_text)
        .filter(|text| looks_like_step(text))
        .collect())
}
