//! Structured content extracted from one fetched page

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A heading captured from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1 through 4
    pub level: u8,
    pub text: String,
    /// Position among the page's headings in document order
    pub order: usize,
}

/// Whether a list was numbered in the source markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ordered => "Ordered",
            Self::Unordered => "Unordered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentList {
    pub kind: ListKind,
    pub items: Vec<String>,
}

/// A same-site link with the text around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: String,
    pub text: String,
    /// Up to 200 characters of the enclosing element's text
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormInput {
    pub name: String,
    /// HTML input type, "text" when the markup omits it
    pub input_type: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageForm {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormInput>,
}

/// One scraped page's structured content
///
/// Created by the extractor right after a successful fetch and never mutated
/// afterwards except for [`ExtractedPage::scored`], which produces the copy
/// carrying the query-dependent score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: String,
    pub description: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub lists: Vec<ContentList>,
    pub links: Vec<PageLink>,
    pub forms: Vec<PageForm>,
    pub steps: Vec<String>,
    pub relevance_score: f64,
    pub fetched_at: DateTime<Utc>,
}

impl ExtractedPage {
    /// Headings sorted by `(order, level)` to approximate reading order
    pub fn headings_in_reading_order(&self) -> Vec<&Heading> {
        let mut headings: Vec<&Heading> = self.headings.iter().collect();
        headings.sort_by_key(|h| (h.order, h.level));
        headings
    }

    /// The page's full text: headings, paragraphs, then formatted list items
    ///
    /// Ordered list items are rendered as `N. item`, unordered ones as `• item`,
    /// one entry per line.
    pub fn rendered_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        for heading in self.headings_in_reading_order() {
            parts.push(heading.text.clone());
        }

        parts.extend(self.paragraphs.iter().cloned());

        for list in &self.lists {
            match list.kind {
                ListKind::Ordered => {
                    for (i, item) in list.items.iter().enumerate() {
                        parts.push(format!("{}. {}", i + 1, item));
                    }
                }
                ListKind::Unordered => {
                    for item in &list.items {
                        parts.push(format!("• {}", item));
                    }
                }
            }
        }

        parts.join("\n")
    }

    /// Returns this page scored against `query`
    pub fn scored(mut self, query: &str) -> Self {
        self.relevance_score = crate::crawler::scorer::score(&self, query);
        self
    }
}
