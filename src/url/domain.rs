use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_digest::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host with a leading `www.` removed
pub fn registrable_host(url: &Url) -> Option<String> {
    extract_domain(url).map(|host| match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => host,
    })
}

/// Checks whether two URLs belong to the same site
///
/// Hosts are compared case-insensitively with `www.` treated as equivalent
/// to the bare host. Ports are ignored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_digest::url::is_same_site;
///
/// let a = Url::parse("https://www.example.com/a").unwrap();
/// let b = Url::parse("https://example.com/b").unwrap();
/// assert!(is_same_site(&a, &b));
/// ```
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    match (registrable_host(a), registrable_host(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Returns the site root of a URL: `scheme://host[:port]`
pub fn site_root(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        _ => url.scheme().to_string() + "://",
    }
}
