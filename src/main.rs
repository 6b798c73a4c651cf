//! Petit-Crawl main entry point
//!
//! This is the command-line interface for the Petit-Crawl single-domain
//! web crawler.

use anyhow::Context;
use clap::Parser;
use petit_crawl::config::{load_config, validate, Config};
use petit_crawl::crawler::crawl;
use petit_crawl::output::write_report_to_target;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Petit-Crawl: a single-domain web crawler
///
/// Crawls every page reachable inside the domain of the starting URL and
/// writes a sitemap listing, for each page, its static assets and the
/// in-domain pages it links to.
#[derive(Parser, Debug)]
#[command(name = "petit-crawl")]
#[command(version)]
#[command(about = "A bounded single-domain web crawler", long_about = None)]
struct Cli {
    /// Starting URL to crawl, e.g. http://www.example.com
    #[arg(long)]
    url: Option<String>,

    /// Number of worker tasks to spawn [default: 100]
    #[arg(long, allow_negative_numbers = true)]
    numworkers: Option<i64>,

    /// Maximum number of pages to collect [default: 500]
    #[arg(long, allow_negative_numbers = true)]
    maxcrawl: Option<i64>,

    /// Maximum time to crawl for, in seconds [default: 180]
    #[arg(long, allow_negative_numbers = true)]
    maxtime: Option<i64>,

    /// Maximum number of assets/children printed per page [default: 10]
    #[arg(long, allow_negative_numbers = true)]
    maxprint: Option<i64>,

    /// File to write the sitemap to; "-" for stdout [default: <domain>.txt]
    #[arg(long)]
    filename: Option<String>,

    /// Optional TOML configuration file; flags override its values
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line flags on top of the file configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.crawl.url = url.clone();
        }
        if let Some(workers) = self.numworkers {
            config.crawl.workers = workers;
        }
        if let Some(max_pages) = self.maxcrawl {
            config.crawl.max_pages = max_pages;
        }
        if let Some(max_time) = self.maxtime {
            config.crawl.max_time = max_time;
        }
        if let Some(print_limit) = self.maxprint {
            config.output.print_limit = print_limit;
        }
        if let Some(filename) = &self.filename {
            config.output.filename = Some(filename.clone());
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("petit_crawl=info,warn"),
            1 => EnvFilter::new("petit_crawl=debug,info"),
            2 => EnvFilter::new("petit_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads configuration, runs the crawl and writes the sitemap
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_to(&mut config);

    let settings = validate(&config).context("invalid crawl configuration")?;
    let start_url = settings.start_url();
    let target = settings.output.clone();
    let print_limit = settings.print_limit;

    let outcome = crawl(settings).await.context("crawl failed")?;

    println!(
        "Status Update. Pages collected {}. Visited {}.",
        outcome.sitemap.len(),
        outcome.visited
    );
    println!("Total time: {:?}", outcome.elapsed);

    write_report_to_target(&target, &outcome, &start_url, print_limit)
        .context("failed to write sitemap")?;

    Ok(())
}
