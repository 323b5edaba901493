//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Convert Amazon product URLs into affiliate links.
///
/// Partnerlink validates each query as an Amazon URL, expands short
/// links, extracts the ASIN, and prints the generated affiliate link
/// results.
#[derive(Parser, Debug)]
#[command(name = "partnerlink")]
#[command(author, version, about)]
pub struct Args {
    /// Queries to process (reads stdin lines when omitted)
    pub queries: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Affiliate partner tag (overrides PARTNERLINK_PARTNER_TAG)
    #[arg(short = 't', long)]
    pub partner_tag: Option<String>,

    /// Metrics file path (overrides PARTNERLINK_METRICS_FILE)
    #[arg(short = 'm', long)]
    pub metrics_file: Option<PathBuf>,

    /// Caller identity used for rate limiting
    #[arg(long, default_value_t = 0)]
    pub caller_id: i64,

    /// Locale for result strings (en, it)
    #[arg(short = 'l', long)]
    pub locale: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["partnerlink"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.queries.is_empty());
        assert!(args.partner_tag.is_none());
        assert_eq!(args.caller_id, 0);
    }

    #[test]
    fn test_cli_positional_queries_collected_in_order() {
        let args = Args::try_parse_from([
            "partnerlink",
            "https://www.amazon.it/dp/B08N5WRWNW",
            "https://amzn.to/3abc",
        ])
        .unwrap();
        assert_eq!(args.queries.len(), 2);
        assert_eq!(args.queries[0], "https://www.amazon.it/dp/B08N5WRWNW");
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["partnerlink", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["partnerlink", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_partner_tag_flag() {
        let args = Args::try_parse_from(["partnerlink", "-t", "mytag-21"]).unwrap();
        assert_eq!(args.partner_tag.as_deref(), Some("mytag-21"));

        let args = Args::try_parse_from(["partnerlink", "--partner-tag", "mytag-21"]).unwrap();
        assert_eq!(args.partner_tag.as_deref(), Some("mytag-21"));
    }

    #[test]
    fn test_cli_locale_flag() {
        let args = Args::try_parse_from(["partnerlink", "-l", "it"]).unwrap();
        assert_eq!(args.locale.as_deref(), Some("it"));
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["partnerlink", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["partnerlink", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
