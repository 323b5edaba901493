//! Query classification: deciding whether text is an Amazon link and
//! pulling the product identifier and storefront domain out of it.
//!
//! Two layers:
//! - [`url`] - host allow-list check and short-link detection
//! - [`asin`] - ASIN extraction, storefront classification, affiliate link derivation

pub mod asin;
pub mod url;

pub use asin::{AmazonDomain, Asin, ProductRef, affiliate_link, extract_asin, extract_domain};
pub use url::{is_plausible_amazon_url, is_short_form};
