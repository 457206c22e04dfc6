//! Digest rendering
//!
//! Turns a ranked list of extracted pages into the text block handed to a
//! language model, citing each URL at most once.

use crate::crawler::{contains_any_term, query_terms, ExtractedPage};
use crate::url::normalize_url;
use serde::Serialize;
use std::collections::HashSet;

const HEADER: &str = "=== LIVE WEBSITE CONTENT ===";
const FOOTER: &str = "=== END LIVE WEBSITE CONTENT ===";

const MAX_STEPS: usize = 5;
/// Only the first lists of a page are considered for the list block
const LISTS_CONSIDERED: usize = 2;
const MAX_LIST_ITEMS: usize = 3;
const MAX_RELATED_LINKS: usize = 3;
const EXCERPT_CHARS: usize = 300;
const TITLE_CHARS: usize = 150;
const LINE_CHARS: usize = 200;

/// Default upper bound on the digest text, in characters
pub const DEFAULT_MAX_CHARS: usize = 6000;

/// A rendered digest and the URLs it cites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub text: String,
    /// Every cited URL, in order of first appearance, each exactly once
    pub sources: Vec<String>,
    /// Number of page sections rendered
    pub page_count: usize,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Renders ranked pages into a size-bounded digest
#[derive(Debug, Clone, Copy)]
pub struct DigestFormatter {
    max_chars: usize,
}

impl Default for DigestFormatter {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl DigestFormatter {
    /// Creates a formatter with a character budget
    ///
    /// Page sections that would push the digest past the budget are dropped;
    /// the first section is always kept.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Renders `pages` (already ranked) for `query`
    ///
    /// # Layout
    ///
    /// ```text
    /// === LIVE WEBSITE CONTENT ===
    /// Query: <query>
    /// Found <n> relevant pages:
    ///
    /// [Page: <title>]
    /// (Source: <url>)
    /// Description: <description>
    ///
    /// Step-by-step instructions:
    /// 1. <step>
    ///
    /// Ordered list:
    /// - <item>
    ///
    /// Related pages:
    /// - <link text>: <url>
    ///
    /// Brief excerpt: <first 300 characters>...
    ///
    /// ---
    /// === END LIVE WEBSITE CONTENT ===
    /// ```
    ///
    /// Empty blocks are omitted. A page whose URL was already cited, either as
    /// a page or as a related link, is skipped. No pages yields an empty digest.
    pub fn render(&self, pages: &[ExtractedPage], query: &str) -> Digest {
        if pages.is_empty() {
            return Digest::default();
        }

        let terms = query_terms(query);
        let mut seen: HashSet<String> = HashSet::new();
        let mut sources: Vec<String> = Vec::new();
        let mut sections: Vec<String> = Vec::new();
        let mut used_chars = HEADER.len() + FOOTER.len() + query.len();

        for page in pages {
            let page_key = url_key(&page.url);
            if seen.contains(&page_key) {
                tracing::debug!("Digest skips already cited {}", page.url);
                continue;
            }

            let mut cited = vec![(page_key, page.url.clone())];
            let section = render_page(page, &terms, &seen, &mut cited);

            if !sections.is_empty() && used_chars + section.len() > self.max_chars {
                tracing::debug!("Digest budget reached before {}", page.url);
                break;
            }

            used_chars += section.len();
            sections.push(section);
            for (key, url) in cited {
                if seen.insert(key) {
                    sources.push(url);
                }
            }
        }

        let mut text = String::new();
        text.push_str(HEADER);
        text.push('\n');
        text.push_str(&format!("Query: {}\n", query));
        text.push_str(&format!("Found {} relevant pages:\n", sections.len()));
        for section in &sections {
            text.push_str(section);
        }
        text.push('\n');
        text.push_str(FOOTER);

        Digest {
            text,
            sources,
            page_count: sections.len(),
        }
    }

    /// Renders only the digest text
    pub fn format(&self, pages: &[ExtractedPage], query: &str) -> String {
        self.render(pages, query).text
    }
}

/// Renders one page section, recording related links it cites in `cited`
fn render_page(
    page: &ExtractedPage,
    terms: &[String],
    seen: &HashSet<String>,
    cited: &mut Vec<(String, String)>,
) -> String {
    let mut out = String::new();

    let title = if page.title.is_empty() {
        page.url.as_str()
    } else {
        page.title.as_str()
    };
    out.push_str(&format!("\n[Page: {}]\n", truncate(title, TITLE_CHARS)));
    out.push_str(&format!("(Source: {})\n", page.url));

    if !page.description.is_empty() {
        out.push_str(&format!(
            "Description: {}\n",
            truncate(&page.description, EXCERPT_CHARS)
        ));
    }

    if !page.steps.is_empty() {
        out.push_str("\nStep-by-step instructions:\n");
        for (i, step) in page.steps.iter().take(MAX_STEPS).enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, truncate(step, LINE_CHARS)));
        }
    }

    let matching_list = page
        .lists
        .iter()
        .take(LISTS_CONSIDERED)
        .find(|list| contains_any_term(&list.items.join(" "), terms));
    if let Some(list) = matching_list {
        out.push_str(&format!("\n{} list:\n", list.kind.label()));
        for item in list.items.iter().take(MAX_LIST_ITEMS) {
            out.push_str(&format!("- {}\n", truncate(item, LINE_CHARS)));
        }
    }

    let mut related: Vec<String> = Vec::new();
    for link in &page.links {
        if related.len() >= MAX_RELATED_LINKS {
            break;
        }

        let key = url_key(&link.url);
        if seen.contains(&key) || cited.iter().any(|(k, _)| *k == key) {
            continue;
        }
        if !contains_any_term(&link.text, terms) && !contains_any_term(&link.url, terms) {
            continue;
        }

        related.push(format!(
            "- {}: {}\n",
            truncate(&link.text, TITLE_CHARS),
            link.url
        ));
        cited.push((key, link.url.clone()));
    }
    if !related.is_empty() {
        out.push_str("\nRelated pages:\n");
        for line in related {
            out.push_str(&line);
        }
    }

    let full_text = page.rendered_text();
    if !full_text.is_empty() {
        let excerpt = truncate(&full_text.replace('\n', " "), EXCERPT_CHARS);
        out.push_str(&format!("\nBrief excerpt: {}\n", excerpt));
    }

    out.push_str("\n---\n");
    out
}

/// Identity used for "already cited" checks
fn url_key(url: &str) -> String {
    normalize_url(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Shortens `text` to at most `max` characters, marking the cut with "..."
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}
