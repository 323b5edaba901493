//! Amazon URL validation and short-link detection.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use url::Url;

/// Hosts (and short-link hosts) accepted as plausible Amazon links.
///
/// Matching is by substring against the lowercased host, so regional
/// prefixes (`www.amazon.it`, `smile.amazon.com`) pass without listing
/// every variant.
const VALID_DOMAINS: &[&str] = &[
    "amazon.com",
    "amazon.it",
    "amazon.de",
    "amazon.fr",
    "amazon.es",
    "amazon.co.uk",
    "amzn.to",
    "amzn.eu",
    "a.co",
    "amzn.com",
];

/// Regex for short redirect links (`amzn.to/XXXX`, `a.co/XXXX`, ...).
///
/// Intentionally a substring match rather than strict URL parsing: a
/// query containing a short pattern anywhere is treated as short-form.
#[allow(clippy::expect_used)]
static SHORT_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:amzn\.(?:eu|to|com|mx)|a\.co)/[A-Za-z0-9]+")
        .expect("short-link regex is valid") // Static pattern, safe to panic
});

/// Returns true iff `text` parses as a URL whose host contains one of
/// the allow-listed Amazon domains. The host alone decides: short links
/// pass through their own allow-list entries, and a short-link pattern
/// on a foreign host is rejected so the resolver never GETs an
/// arbitrary server.
///
/// Malformed input yields `false`, never an error.
///
/// # Examples
///
/// ```
/// use partnerlink::classify::is_plausible_amazon_url;
///
/// assert!(is_plausible_amazon_url("https://www.amazon.it/dp/B08N5WRWNW"));
/// assert!(is_plausible_amazon_url("https://amzn.to/3xYz12A"));
/// assert!(!is_plausible_amazon_url("https://example.com/dp/B08N5WRWNW"));
/// assert!(!is_plausible_amazon_url("not a url"));
/// ```
#[must_use]
pub fn is_plausible_amazon_url(text: &str) -> bool {
    let Ok(parsed) = Url::parse(text) else {
        trace!(text, "input does not parse as a URL");
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();
    VALID_DOMAINS.iter().any(|domain| host.contains(domain))
}

/// Returns true iff `text` contains a short redirect-link pattern that
/// must be expanded over the network before ASIN extraction.
#[must_use]
pub fn is_short_form(text: &str) -> bool {
    SHORT_LINK_PATTERN.is_match(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== is_plausible_amazon_url ====================

    #[test]
    fn test_plausible_all_marketplace_domains() {
        for url in [
            "https://www.amazon.com/dp/B08N5WRWNW",
            "https://www.amazon.it/dp/B08N5WRWNW",
            "https://www.amazon.de/dp/B08N5WRWNW",
            "https://www.amazon.fr/dp/B08N5WRWNW",
            "https://www.amazon.es/dp/B08N5WRWNW",
            "https://www.amazon.co.uk/dp/B08N5WRWNW",
        ] {
            assert!(is_plausible_amazon_url(url), "should accept {url}");
        }
    }

    #[test]
    fn test_plausible_short_hosts() {
        assert!(is_plausible_amazon_url("https://amzn.to/3xYz12A"));
        assert!(is_plausible_amazon_url("https://amzn.eu/d/abc123"));
        assert!(is_plausible_amazon_url("https://a.co/d/abc123"));
    }

    #[test]
    fn test_plausible_host_case_insensitive() {
        assert!(is_plausible_amazon_url("https://WWW.AMAZON.IT/dp/B08N5WRWNW"));
    }

    #[test]
    fn test_not_plausible_other_domains() {
        assert!(!is_plausible_amazon_url("https://example.com/dp/B08N5WRWNW"));
        assert!(!is_plausible_amazon_url("https://ebay.com/itm/12345"));
    }

    #[test]
    fn test_not_plausible_lookalike_path_only() {
        // Allow-listed substring in the path is not enough; the host decides.
        assert!(!is_plausible_amazon_url("https://evil.example/amazon.it/dp/B08N5WRWNW"));
    }

    #[test]
    fn test_not_plausible_short_pattern_on_foreign_host() {
        // A short-link pattern in the path of a non-Amazon host must not
        // pass; otherwise the resolver would GET an arbitrary server.
        assert!(!is_plausible_amazon_url("https://evil.example/amzn.to/3xYz12A"));
        assert!(!is_plausible_amazon_url("https://redirect.example/a.co/d7F3kQ"));
    }

    #[test]
    fn test_not_plausible_malformed_input() {
        assert!(!is_plausible_amazon_url("not a url"));
        assert!(!is_plausible_amazon_url(""));
        assert!(!is_plausible_amazon_url("://missing-scheme"));
    }

    // ==================== is_short_form ====================

    #[test]
    fn test_short_form_variants() {
        assert!(is_short_form("https://amzn.to/3xYz12A"));
        assert!(is_short_form("https://amzn.eu/d1CkQ0"));
        assert!(is_short_form("https://amzn.com/B08N5WRWNW"));
        assert!(is_short_form("https://amzn.mx/abc"));
        assert!(is_short_form("https://a.co/d7F3kQ"));
    }

    #[test]
    fn test_short_form_embedded_in_text() {
        // Substring semantics: a short pattern anywhere marks the query short-form.
        assert!(is_short_form("check this out amzn.to/3xYz12A please"));
    }

    #[test]
    fn test_short_form_case_insensitive() {
        assert!(is_short_form("https://AMZN.TO/3xYz12A"));
    }

    #[test]
    fn test_not_short_form_full_urls() {
        assert!(!is_short_form("https://www.amazon.it/dp/B08N5WRWNW"));
        assert!(!is_short_form("https://www.amazon.co.uk/gp/product/B08N5WRWNW"));
    }

    #[test]
    fn test_not_short_form_bare_host() {
        // Host without a path segment is not a short link.
        assert!(!is_short_form("https://amzn.to/"));
        assert!(!is_short_form("amzn.to"));
    }
}
