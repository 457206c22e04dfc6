use crate::{UrlError, UrlResult};
use url::Url;

/// Query parameters that only identify a campaign or click
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the identity key used for crawl bookkeeping
///
/// Two URLs that would return the same page normalize to the same value:
/// - only `http` and `https` are accepted, and a host is required
/// - the host is lowercased and dot segments resolved (done by the parser)
/// - the fragment is dropped
/// - empty path segments and the trailing slash are dropped; the root stays `/`
/// - `utm_*` and click-id parameters are dropped, the rest sorted by name
///
/// Scheme, `www.` and port are kept since they change what gets fetched.
///
/// # Examples
///
/// ```
/// use site_digest::url::normalize_url;
///
/// let url = normalize_url("https://Example.COM/admissions/?utm_source=x#apply").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/admissions");
/// ```
pub fn normalize_url(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    let path = compact_path(url.path());
    url.set_path(&path);

    if url.query().is_some() {
        let kept = kept_query_pairs(&url);
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

fn compact_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    format!("/{}", segments.join("/"))
}

fn is_tracking_param(name: &str) -> bool {
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name)
}

fn kept_query_pairs(url: &Url) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !is_tracking_param(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}
