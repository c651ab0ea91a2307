//! comment-init CLI
//!
//! Opens a comment thread for every page in the sitemap that lacks one.

use std::path::PathBuf;

use clap::Parser;
use comment_init::{error::Result, models::Config, pipeline};

/// Initialize Gitalk/Gitment comment threads for a static site
#[derive(Parser, Debug)]
#[command(name = "comment-init", version, about)]
struct Cli {
    /// GitHub token with permission to create issues
    token: String,

    /// Path to the config file
    #[arg(short, long, default_value = "comment-init.toml")]
    config: PathBuf,

    /// Sitemap to read (overrides site.sitemap_path)
    #[arg(long)]
    sitemap: Option<PathBuf>,

    /// Report pages without a thread and create nothing
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .target(env_logger::Target::Stdout)
        .init();
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::load_or_default(&cli.config);
    config.github.token = cli.token;
    if let Some(sitemap) = cli.sitemap {
        config.site.sitemap_path = sitemap;
    }

    let report = pipeline::run_init(&config, cli.dry_run).await?;

    log::info!(
        "Sitemap: {} URLs, existing issues: {}, pending: {}",
        report.sitemap_urls,
        report.existing_issues,
        report.pending.len()
    );
    if report.integrity_problems > 0 {
        log::warn!(
            "{} issues had unreadable labels and were ignored",
            report.integrity_problems
        );
    }
    if !report.dry_run {
        log::info!(
            "Created: {}, failed: {}, unconfirmed: {}",
            report.created.len(),
            report.failed.len(),
            report.unconfirmed.len()
        );
    }
    for failed in &report.failed {
        log::warn!("  {}: {}", failed.url, failed.reason);
    }

    Ok(report.is_success())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("comment-init starting...");

    match run(cli).await {
        Ok(true) => log::info!("Done!"),
        Ok(false) => {
            log::error!("Some threads could not be created");
            std::process::exit(1);
        }
        Err(error) => {
            log::error!("{}", error);
            std::process::exit(1);
        }
    }
}
