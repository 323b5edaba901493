//! ASIN extraction, storefront classification and affiliate-link derivation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

/// Ordered extraction patterns. `/dp/` comes first because it is the
/// most specific and by far the most common product-URL shape; the bare
/// identifier form after a host segment is the last resort.
#[allow(clippy::expect_used)]
static ASIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)/dp/([A-Z0-9]{10})",
        r"(?i)/gp/product/([A-Z0-9]{10})",
        r"(?i)/product/([A-Z0-9]{10})",
        r"(?i)(?:amazon\.[a-z.]+/|amzn\.com/)([A-Z0-9]{10})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("ASIN regex is valid")) // Static patterns, safe to panic
    .collect()
});

/// A validated 10-character Amazon product identifier.
///
/// Always stored uppercase; construction rejects anything that is not
/// exactly ten ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asin(String);

impl Asin {
    /// Validates and normalizes a candidate identifier.
    #[must_use]
    pub fn parse(candidate: &str) -> Option<Self> {
        if candidate.len() == 10 && candidate.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Self(candidate.to_ascii_uppercase()))
        } else {
            None
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amazon storefront variants the pipeline can emit affiliate links for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AmazonDomain {
    Com,
    #[default]
    It,
    De,
    Fr,
    Es,
    CoUk,
}

impl AmazonDomain {
    /// All variants in classification order (checked first to last).
    const ALL: [Self; 6] = [Self::Com, Self::It, Self::De, Self::Fr, Self::Es, Self::CoUk];

    /// Returns the storefront host, e.g. `amazon.co.uk`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Com => "amazon.com",
            Self::It => "amazon.it",
            Self::De => "amazon.de",
            Self::Fr => "amazon.fr",
            Self::Es => "amazon.es",
            Self::CoUk => "amazon.co.uk",
        }
    }

    /// Finds the first storefront whose name appears in `url`, or `None`.
    ///
    /// Case-insensitive substring match; short links carry no storefront
    /// information and yield `None`.
    #[must_use]
    pub fn find(url: &str) -> Option<Self> {
        let lowered = url.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|domain| lowered.contains(domain.as_str()))
    }
}

impl fmt::Display for AmazonDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product reference: validated ASIN plus the storefront it was seen on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub asin: Asin,
    pub domain: AmazonDomain,
}

/// Extracts an ASIN from a (possibly already resolved) URL.
///
/// Applies the ordered pattern list and returns the first capture.
/// `None` is an expected, common outcome for URLs that are Amazon-hosted
/// but not product pages, not an error condition.
#[must_use]
pub fn extract_asin(url: &str) -> Option<Asin> {
    for pattern in ASIN_PATTERNS.iter() {
        if let Some(capture) = pattern.captures(url).and_then(|c| c.get(1)) {
            let asin = Asin::parse(capture.as_str())?;
            debug!(%asin, "ASIN extracted");
            return Some(asin);
        }
    }
    trace!(url, "no ASIN pattern matched");
    None
}

/// Classifies the storefront domain for `url`, defaulting to `amazon.it`
/// when no known variant appears (short links, bare identifiers).
#[must_use]
pub fn extract_domain(url: &str) -> AmazonDomain {
    AmazonDomain::find(url).unwrap_or_default()
}

/// Derives the affiliate link for a product with the configured partner
/// tag. Pure function; the tag is resolved once at startup.
#[must_use]
pub fn affiliate_link(product: &ProductRef, partner_tag: &str) -> String {
    format!(
        "https://www.{domain}/dp/{asin}?tag={partner_tag}",
        domain = product.domain,
        asin = product.asin
    )
}
