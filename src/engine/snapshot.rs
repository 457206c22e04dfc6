//! Whole-site snapshots
//!
//! A snapshot is a small categorized sample of a site's pages, kept in the
//! long-lived cache and used as background knowledge about the site.

use crate::crawler::ExtractedPage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// Topic a snapshot page is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "Admissions")]
    Admissions,
    #[serde(rename = "Academics")]
    Academics,
    #[serde(rename = "About")]
    About,
    #[serde(rename = "Contact")]
    Contact,
    #[serde(rename = "News & Events")]
    NewsEvents,
    #[serde(rename = "Fees & Tuition")]
    FeesTuition,
    #[serde(rename = "Website Content")]
    General,
}

/// Keyword table checked in order; the first category with a hit wins
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Admissions, &["admission", "apply", "enroll"]),
    (Category::Academics, &["academic", "curriculum", "program"]),
    (Category::About, &["about", "overview", "mission"]),
    (Category::Contact, &["contact", "location", "address"]),
    (Category::NewsEvents, &["news", "event", "announcement"]),
    (Category::FeesTuition, &["tuition", "fee", "cost", "payment"]),
];

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admissions => "Admissions",
            Self::Academics => "Academics",
            Self::About => "About",
            Self::Contact => "Contact",
            Self::NewsEvents => "News & Events",
            Self::FeesTuition => "Fees & Tuition",
            Self::General => "Website Content",
        }
    }
}

/// Files a page by keywords in its URL path or title
pub fn categorize(url: &str, title: &str) -> Category {
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default();
    let title = title.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|kw| path.contains(kw) || title.contains(kw))
        })
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// One categorized page of a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub category: Category,
    pub title: String,
    /// Description (when present) followed by the page's rendered text
    pub content: String,
    pub tags: Vec<String>,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
}

impl SnapshotEntry {
    pub fn from_page(page: &ExtractedPage) -> Self {
        let title = if page.title.is_empty() {
            page.url.clone()
        } else {
            page.title.clone()
        };

        let body = page.rendered_text();
        let content = if page.description.is_empty() {
            body
        } else {
            format!("{}\n\n{}", page.description, body)
        };

        let last_segment = Url::parse(&page.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut segments| segments.next_back().map(|s| s.to_string()))
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "home".to_string());

        Self {
            category: categorize(&page.url, &page.title),
            title: format!("{} (Website)", title),
            content,
            tags: vec![
                "website".to_string(),
                "live_content".to_string(),
                last_segment,
            ],
            source_url: page.url.clone(),
            scraped_at: page.fetched_at,
        }
    }
}

/// A categorized sample of one site
#[derive(Debug, Clone, Serialize)]
pub struct SiteSnapshot {
    pub site: String,
    pub taken_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

impl SiteSnapshot {
    pub fn new(site: impl Into<String>, pages: &[ExtractedPage]) -> Self {
        Self {
            site: site.into(),
            taken_at: Utc::now(),
            entries: pages.iter().map(SnapshotEntry::from_page).collect(),
        }
    }

    /// Entries filed under `category`
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn source_urls(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.source_url.as_str()).collect()
    }

    /// Plain-text listing grouped by category
    pub fn render(&self) -> String {
        let mut out = format!(
            "Snapshot of {} ({} pages, taken {})\n",
            self.site,
            self.entries.len(),
            self.taken_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let mut categories: Vec<Category> = self.entries.iter().map(|e| e.category).collect();
        categories.sort();
        categories.dedup();

        for category in categories {
            out.push_str(&format!("\n## {}\n", category.label()));
            for entry in self.in_category(category) {
                out.push_str(&format!("- {} <{}>\n", entry.title, entry.source_url));
            }
        }

        out
    }
}
