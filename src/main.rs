//! CLI entry point for the partnerlink tool.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Result, bail};
use clap::Parser;
use partnerlink::{Pipeline, Query, Settings, handle_inline_query};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Partnerlink starting");

    // Environment settings with CLI overrides
    let mut settings = Settings::from_env();
    if let Some(tag) = args.partner_tag {
        settings.partner_tag = tag;
    }
    if let Some(path) = args.metrics_file {
        settings.metrics_file = path;
    }
    if settings.partner_tag.is_empty() {
        bail!("no partner tag configured; set PARTNERLINK_PARTNER_TAG or pass --partner-tag");
    }

    // Read input: from positional args or stdin
    let queries = if args.queries.is_empty() {
        if io::stdin().is_terminal() {
            info!("No input provided. Pipe queries via stdin or pass as arguments.");
            info!("Example: partnerlink -t mytag-21 'https://www.amazon.it/dp/B08N5WRWNW'");
            return Ok(());
        }
        io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()?
    } else {
        args.queries
    };

    let pipeline = Pipeline::from_settings(settings);

    for (index, text) in queries.iter().enumerate() {
        let query = Query {
            raw_text: text.clone(),
            caller_id: args.caller_id,
            caller_locale: args.locale.clone(),
        };
        let items = handle_inline_query(&pipeline, &query).await;
        debug!(query = index, items = items.len(), "query handled");
        for item in items {
            println!("[{}] {}", item.id, item.title);
            println!("    {}", item.description);
            for line in item.message_body.lines() {
                println!("    {line}");
            }
        }
    }

    let snap = pipeline.metrics().snapshot();
    info!(
        total = snap.total_queries,
        converted = snap.successful_conversions,
        failed = snap.failed_extractions,
        rate_limited = snap.rate_limited,
        "Run complete"
    );

    Ok(())
}
