//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website mirroring
//! engine.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{expand_path, load_config, split_list, validate, MirrorConfig};
use site_mirror::output::{print_summary, TraceProgress};
use site_mirror::Mirror;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: a recursive website mirroring engine
///
/// Site-Mirror downloads every page reachable from a URL on that URL's host,
/// along with the images, scripts and stylesheets those pages reference, and
/// can rewrite the saved pages for offline browsing.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version = "1.0.0")]
#[command(about = "A recursive website mirroring engine", long_about = None)]
struct Cli {
    /// URL to start mirroring from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to save the mirror under (one folder per host)
    #[arg(short = 'P', long = "directory-prefix", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Comma separated file extensions to skip, e.g. "png,jpg"
    #[arg(short = 'R', long = "reject", value_name = "LIST")]
    reject: Option<String>,

    /// Comma separated path patterns to skip, each starting with '/'
    #[arg(short = 'X', long = "exclude", value_name = "LIST")]
    exclude: Option<String>,

    /// Rewrite saved pages so links point at the local copies
    #[arg(long)]
    convert_links: bool,

    /// Per-download bandwidth cap, e.g. "200k" or "2M"
    #[arg(long, value_name = "RATE")]
    rate_limit: Option<String>,

    /// Maximum number of links handled at once
    #[arg(long, value_name = "N")]
    max_concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let mirror = Mirror::new(&cli.url, config)
        .with_context(|| format!("Cannot mirror {}", cli.url))?
        .with_progress(Arc::new(TraceProgress));
    let mirror = Arc::new(mirror);

    let cancel = mirror.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping downloads");
            cancel.cancel();
        }
    });

    let summary = match mirror.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        println!();
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<MirrorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => MirrorConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.crawl.output_dir = expand_path(dir);
    }
    if let Some(reject) = &cli.reject {
        config.crawl.reject_extensions = split_list(reject);
    }
    if let Some(exclude) = &cli.exclude {
        config.crawl.reject_paths = split_list(exclude);
    }
    if cli.convert_links {
        config.crawl.convert_links = true;
    }
    if let Some(rate) = &cli.rate_limit {
        config.crawl.rate_limit = Some(rate.clone());
    }
    if let Some(max) = cli.max_concurrency {
        config.crawl.max_concurrency = max;
    }

    validate(&config).context("Invalid mirror settings")?;
    Ok(config)
}
