use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use chartup::config::Config;
use chartup::logging::{self, LogFormat};
use chartup::parser::Scanner;
use chartup::report::{self, ReportOptions};
use chartup::version::cache::Cache;
use chartup::version::checker::Checker;
use chartup::version::registries::UpstreamClient;

#[derive(Parser)]
#[command(name = "chartup")]
#[command(
    version,
    about = "Check Helm charts and Docker images for updates",
    after_help = "Supported registries:\n  Docker Hub, Quay.io, ghcr.io, gcr.io, registry.k8s.io"
)]
struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Show all items (default: only updates and errors)
    #[arg(long)]
    verbose: bool,

    /// Ignore cached results but still write fresh ones
    #[arg(long)]
    refresh: bool,

    /// Neither read nor write the cache file
    #[arg(long, conflicts_with = "refresh")]
    no_cache: bool,

    /// Cache file (default: .chartup-cache.json in the working directory)
    #[arg(long, value_name = "PATH")]
    cache_file: Option<PathBuf>,

    /// Configuration file (default: .chartup.json in the scanned directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log record format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_format);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = &cli.directory;
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let config = Config::load(cli.config.as_deref(), dir).context("Failed to load configuration")?;

    let cache = if cli.no_cache {
        Cache::disabled()
    } else {
        let path = cli.cache_file.clone().unwrap_or_else(|| config.cache.path.clone());
        Cache::new(path, config.cache.ttl_secs, cli.refresh)
    };
    if let Err(e) = cache.load() {
        warn!("Could not load cache: {}", e);
        eprintln!("Warning: could not load cache: {}", e);
    }

    println!("Scanning {} for Helm charts...\n", dir.display());
    let scan = Scanner::new(&config)
        .scan(dir)
        .context("Error scanning directory")?;

    if scan.is_empty() {
        println!("No Helm charts or Docker images found.");
        return Ok(());
    }
    info!(
        "Found {} images and {} charts",
        scan.images.len(),
        scan.charts.len()
    );

    let upstream = UpstreamClient::new(config.upstreams.clone());
    let outcome = Checker::new(&cache, &upstream).check_all(&scan).await;

    if outcome.rate_limited() {
        eprintln!("\n{}", report::rate_limit_banner(config.cache.ttl_secs));
    }

    if let Err(e) = cache.save() {
        warn!("Could not save cache: {}", e);
        eprintln!("Warning: could not save cache: {}", e);
    }

    let options = ReportOptions {
        base_dir: dir.clone(),
        verbose: cli.verbose,
    };
    print!("{}", report::render(&outcome.results, &options));

    Ok(())
}
