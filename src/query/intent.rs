//! Query intent analysis
//!
//! Keyword heuristics that tell the engine what kind of answer a query is
//! after, used to widen the crawl query and to annotate the prompt context.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const INSTRUCTION_KEYWORDS: &[&str] = &[
    "how to",
    "steps",
    "process",
    "guide",
    "tutorial",
    "procedure",
    "instructions",
    "apply",
    "fill",
    "submit",
];

const URL_KEYWORDS: &[&str] = &[
    "url", "link", "page", "where", "find", "locate", "navigate", "access",
];

const FORM_KEYWORDS: &[&str] = &[
    "form",
    "application",
    "registration",
    "submit",
    "fill out",
    "apply",
];

const NAVIGATION_KEYWORDS: &[&str] = &[
    "navigate",
    "find",
    "where is",
    "location of",
    "how to get to",
];

static TOPIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"about\s+(\w+)",
        r"information\s+on\s+(\w+)",
        r"details\s+(?:on|about)\s+(\w+)",
        r"(\w+)\s+(?:process|procedure|form|application)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// What a query asks for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryIntent {
    pub needs_instructions: bool,
    pub needs_urls: bool,
    pub needs_form_help: bool,
    pub needs_navigation: bool,
    /// Words the query names as its subject, e.g. "admission" in "admission process"
    pub topics: Vec<String>,
}

impl QueryIntent {
    /// Analyzes a (target-free) query
    ///
    /// # Example
    ///
    /// ```
    /// use site_digest::QueryIntent;
    ///
    /// let intent = QueryIntent::analyze("How to fill out the enrollment form");
    /// assert!(intent.needs_instructions);
    /// assert!(intent.needs_form_help);
    /// assert_eq!(intent.topics, vec!["enrollment".to_string()]);
    /// ```
    pub fn analyze(query: &str) -> Self {
        let query = query.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|kw| query.contains(kw));

        let mut topics: Vec<String> = Vec::new();
        for pattern in TOPIC_PATTERNS.iter() {
            for caps in pattern.captures_iter(&query) {
                if let Some(topic) = caps.get(1) {
                    let topic = topic.as_str().to_string();
                    if !topics.contains(&topic) {
                        topics.push(topic);
                    }
                }
            }
        }

        Self {
            needs_instructions: mentions(INSTRUCTION_KEYWORDS),
            needs_urls: mentions(URL_KEYWORDS),
            needs_form_help: mentions(FORM_KEYWORDS),
            needs_navigation: mentions(NAVIGATION_KEYWORDS),
            topics,
        }
    }

    /// Widens `question` with terms matching the detected needs
    pub fn scraping_query(&self, question: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !question.trim().is_empty() {
            parts.push(question.trim());
        }
        if self.needs_instructions {
            parts.push("instructions steps process");
        }
        if self.needs_urls {
            parts.push("links pages navigation");
        }
        if self.needs_form_help {
            parts.push("form application submit");
        }
        parts.join(" ")
    }

    /// Renders the query analysis block appended to the prompt context
    pub fn guidance(&self, site: &str, question: &str) -> String {
        let mut out = String::from("\n\nUser Query Analysis:\n");
        out.push_str(&format!("- Website: {}\n", site));
        out.push_str(&format!("- Question: {}\n", question));

        if self.needs_instructions {
            out.push_str("- User needs step-by-step instructions\n");
        }
        if self.needs_urls {
            out.push_str("- User needs specific URLs/links\n");
        }
        if self.needs_form_help {
            out.push_str("- User needs help with forms/applications\n");
        }
        if self.needs_navigation {
            out.push_str("- User needs help navigating the site\n");
        }
        if !self.topics.is_empty() {
            out.push_str(&format!("- Specific topics: {}\n", self.topics.join(", ")));
        }

        out
    }
}
