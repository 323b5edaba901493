//! Locale string tables for user-facing result items.
//!
//! Keys are dotted paths (`error.rate_limit.title`); lookups fall back
//! to the default locale ("en") and finally to the key itself, so a
//! missing translation degrades visibly instead of panicking.
//! Placeholders use `{name}` syntax and are substituted from the pairs
//! passed to [`Translations::format`].

use std::collections::HashMap;
use std::sync::LazyLock;

/// Locale the tables fall back to for unknown locales or missing keys.
pub const DEFAULT_LOCALE: &str = "en";

type Table = HashMap<&'static str, &'static str>;

static TABLES: LazyLock<HashMap<&'static str, Table>> = LazyLock::new(|| {
    let mut tables = HashMap::new();

    let en: Table = HashMap::from([
        ("error.url_error.title", "⚠️ Invalid URL"),
        ("error.url_error.description", "Please enter a valid Amazon URL"),
        (
            "error.url_error.message",
            "❌ The URL provided does not appear to be an Amazon link.",
        ),
        ("error.asin_error.title", "⚠️ ASIN not found"),
        ("error.asin_error.description", "Unable to extract ASIN from URL"),
        (
            "error.asin_error.message",
            "❌ I was unable to extract the ASIN from the URL provided.\nMake sure it's a valid Amazon link (even a short one).",
        ),
        ("error.rate_limit.title", "⚠️ Too fast!"),
        (
            "error.rate_limit.description",
            "Maximum {max_queries} requests per minute. Try again soon.",
        ),
        (
            "error.rate_limit.message",
            "⚠️ You have exceeded the limit of {max_queries} requests per minute. Please wait a moment.",
        ),
        ("info.partner_link_generated.title", "🔗 Affiliate link generated"),
        (
            "info.partner_link_generated.description",
            "ASIN: {asin} | Domain: {domain}",
        ),
        (
            "info.partner_link_generated.message",
            "🔗 Amazon Affiliate Link:\n\n{affiliate_link}\n\n",
        ),
        ("info.only_asin_link.title", "📋 Send only the link"),
        ("info.only_asin_link.description", "Without additional text"),
    ]);

    let it: Table = HashMap::from([
        ("error.url_error.title", "⚠️ URL non valido"),
        ("error.url_error.description", "Inserisci un URL Amazon valido"),
        (
            "error.url_error.message",
            "❌ L'URL fornito non sembra essere un link Amazon.",
        ),
        ("error.asin_error.title", "⚠️ ASIN non trovato"),
        ("error.asin_error.description", "Non riesco a trovare l'ASIN nell'URL"),
        (
            "error.asin_error.message",
            "❌ Non sono riuscito a estrarre l'ASIN dall'URL fornito.\nAssicurati che sia un link Amazon valido (anche breve).",
        ),
        ("error.rate_limit.title", "⚠️ Troppo veloce!"),
        (
            "error.rate_limit.description",
            "Massimo {max_queries} richieste al minuto. Riprova tra poco.",
        ),
        (
            "error.rate_limit.message",
            "⚠️ Hai superato il limite di {max_queries} richieste al minuto. Attendi un momento.",
        ),
        ("info.partner_link_generated.title", "🔗 Link di affiliazione generato"),
        (
            "info.partner_link_generated.description",
            "ASIN: {asin} | Dominio: {domain}",
        ),
        (
            "info.partner_link_generated.message",
            "🔗 Link di affiliazione Amazon:\n\n{affiliate_link}\n\n",
        ),
        ("info.only_asin_link.title", "📋 Invia solo il link"),
        ("info.only_asin_link.description", "Senza testo aggiuntivo"),
    ]);

    tables.insert("en", en);
    tables.insert("it", it);
    tables
});

/// Lookup handle over the static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translations;

impl Translations {
    /// Returns the string for `key` in `locale`, falling back to the
    /// default locale, then to the key itself.
    #[must_use]
    pub fn get(&self, key: &str, locale: Option<&str>) -> String {
        let lookup = |lang: &str| TABLES.get(lang).and_then(|table| table.get(key)).copied();

        locale
            .and_then(lookup)
            .or_else(|| lookup(DEFAULT_LOCALE))
            .unwrap_or(key)
            .to_string()
    }

    /// Like [`get`](Self::get), substituting `{name}` placeholders from
    /// `args`. Unknown placeholders pass through untouched.
    #[must_use]
    pub fn format(&self, key: &str, locale: Option<&str>, args: &[(&str, &str)]) -> String {
        let mut text = self.get(key, locale);
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}
