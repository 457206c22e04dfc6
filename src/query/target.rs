//! Target site detection in free-form queries

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("hardcoded regex pattern is valid"));

/// Bare domains need an alphabetic TLD so numbers like "3.5" never match
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:www\.)?(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}\b")
        .expect("hardcoded regex pattern is valid")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// Finds the site a query is about
///
/// The first `http(s)://` token wins; failing that, the first bare domain is
/// taken as an `https://` URL. The matched token is removed from the query
/// and the remaining whitespace collapsed.
///
/// # Returns
///
/// `(Some(url), cleaned_query)` when a target was found, otherwise
/// `(None, query)` with only whitespace normalized.
///
/// # Example
///
/// ```
/// use site_digest::extract_target;
///
/// let (url, question) = extract_target("how to apply at https://example.edu/admissions");
/// assert_eq!(url.unwrap().as_str(), "https://example.edu/admissions");
/// assert_eq!(question, "how to apply at");
/// ```
pub fn extract_target(query: &str) -> (Option<Url>, String) {
    if let Some(found) = URL_PATTERN.find(query) {
        let token = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if let Ok(url) = Url::parse(token) {
            let cleaned = remove_span(query, found.start(), found.start() + token.len());
            return (Some(url), cleaned);
        }
    }

    if let Some(found) = DOMAIN_PATTERN.find(query) {
        if let Ok(url) = Url::parse(&format!("https://{}", found.as_str())) {
            let cleaned = remove_span(query, found.start(), found.end());
            return (Some(url), cleaned);
        }
    }

    (None, collapse_whitespace(query))
}

/// Lowercases and collapses whitespace, giving the cache-key form of a query
pub fn normalize_query(query: &str) -> String {
    collapse_whitespace(&query.to_lowercase())
}

fn remove_span(query: &str, start: usize, end: usize) -> String {
    collapse_whitespace(&format!("{} {}", &query[..start], &query[end..]))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
