//! Query relevance scoring
//!
//! The score is a plain term-frequency count over a page's rendered text. It
//! carries no IDF weighting or stemming; the only guarantee is determinism.

use crate::crawler::page::ExtractedPage;

/// Score returned for an empty query, where ranking is irrelevant
pub const NEUTRAL_SCORE: f64 = 1.0;

/// Splits a query into lowercase whitespace-separated terms
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|term| term.to_string())
        .collect()
}

/// Checks whether `text` contains any of the terms
///
/// `text` is compared case-insensitively; terms are expected in lowercase as
/// returned by [`query_terms`].
pub fn contains_any_term(text: &str, terms: &[String]) -> bool {
    let text = text.to_lowercase();
    terms.iter().any(|term| text.contains(term.as_str()))
}

/// Computes the relevance of `page` to `query`
///
/// An empty (or whitespace-only) query scores [`NEUTRAL_SCORE`]. Otherwise
/// each term adds its non-overlapping occurrence count in the page's
/// lowercased rendered text.
pub fn score(page: &ExtractedPage, query: &str) -> f64 {
    let terms = query_terms(query);
    if terms.is_empty() {
        return NEUTRAL_SCORE;
    }

    let full_text = page.rendered_text().to_lowercase();

    terms
        .iter()
        .map(|term| full_text.matches(term.as_str()).count() as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::page::fixtures::empty_page;
    use crate::crawler::page::{ContentList, Heading, ListKind};

    fn admissions_page() -> ExtractedPage {
        let mut page = empty_page("https://example.com/admissions");
        page.headings = vec![Heading {
            level: 1,
            text: "Admission Process".to_string(),
            order: 0,
        }];
        page.paragraphs = vec!["Every admission starts with an online application form.".to_string()];
        page.lists = vec![ContentList {
            kind: ListKind::Ordered,
            items: vec!["Submit the application".to_string()],
        }];
        page
    }

    #[test]
    fn test_empty_query_is_neutral() {
        assert_eq!(score(&admissions_page(), ""), 1.0);
        assert_eq!(score(&admissions_page(), "   "), 1.0);
        assert_eq!(score(&empty_page("https://example.com/"), ""), 1.0);
    }

    #[test]
    fn test_counts_occurrences_per_term() {
        // "admission" x2, "application" x2
        assert_eq!(score(&admissions_page(), "Admission application"), 4.0);
    }

    #[test]
    fn test_empty_page_scores_zero() {
        assert_eq!(score(&empty_page("https://example.com/"), "tuition"), 0.0);
    }

    #[test]
    fn test_title_is_not_scored() {
        let mut page = empty_page("https://example.com/");
        page.title = "Tuition".to_string();
        assert_eq!(score(&page, "tuition"), 0.0);
    }

    #[test]
    fn test_more_occurrences_never_decrease_score() {
        let mut page = admissions_page();
        let before = score(&page, "admission");

        page.paragraphs.push("Admission interviews follow the admission exam.".to_string());
        let after = score(&page, "admission");

        assert!(after >= before);
        assert_eq!(after, before + 2.0);
    }

    #[test]
    fn test_deterministic() {
        let page = admissions_page();
        assert_eq!(score(&page, "process form"), score(&page, "process form"));
    }

    #[test]
    fn test_query_terms() {
        assert_eq!(
            query_terms("  How TO  apply "),
            vec!["how".to_string(), "to".to_string(), "apply".to_string()]
        );
        assert!(query_terms("").is_empty());
    }

    #[test]
    fn test_contains_any_term() {
        let terms = query_terms("tuition fees");
        assert!(contains_any_term("Our TUITION schedule", &terms));
        assert!(!contains_any_term("Campus map", &terms));
        assert!(!contains_any_term("Campus map", &[]));
    }
}
