use anyhow::Context;
use chrono::NaiveDate;
use clap::ArgMatches;
use colored::Colorize;
use patchwalk_core::aggregate::Aggregator;
use patchwalk_core::cache::ArtifactCache;
use patchwalk_core::config::RunConfig;
use patchwalk_core::report::{Report, ReportFormat, generate_report, save_report};
use patchwalk_core::walk::{WalkOptions, Walker};
use patchwalk_scanner::tracker::canonical_bug_url;
use patchwalk_scanner::{BugTracker, Diffstat, HttpClient, RevisionServer, ScanError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use url::Url;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Turn parsed arguments into a validated run configuration.
pub fn config_from_matches(matches: &ArgMatches) -> Result<RunConfig, ScanError> {
    let bug = matches.get_one::<Url>("bug").ok_or_else(|| {
        ScanError::InvalidInput(
            "Pass a bug URL with the --bug parameter (for example: \
            --bug https://bugzilla.mozilla.org/show_bug.cgi?id=1566221)"
                .to_string(),
        )
    })?;
    let root_bug = canonical_bug_url(bug.as_str())?;

    let mut config = RunConfig::new(root_bug);
    config.after = matches.get_one::<NaiveDate>("after").copied();
    config.headless = matches.get_flag("headless");
    config.disable_cache = matches.get_flag("disable-cache");

    if let Some(max_depth) = matches.get_one::<usize>("max-depth") {
        config.max_depth = *max_depth;
    }
    if let Some(cache_dir) = matches.get_one::<String>("cache-dir") {
        config.cache_dir = expand_path(cache_dir);
    }
    if let Some(repository) = matches.get_one::<Url>("repo") {
        config.repository = repository.clone();
    }
    if let Some(diffstat) = matches.get_one::<String>("diffstat") {
        config.diffstat = diffstat.clone();
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        if *timeout == 0 {
            return Err(ScanError::InvalidInput(
                "--timeout must be at least 1 second".to_string(),
            ));
        }
        config.timeout_secs = *timeout;
    }
    if let Some(retries) = matches.get_one::<u32>("retries") {
        config.retries = *retries;
    }

    Ok(config)
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Walk the dependency tree and aggregate its patches.
pub async fn run(config: &RunConfig) -> anyhow::Result<Report> {
    let http = HttpClient::with_timeout(config.timeout_secs)
        .context("Failed to create HTTP client")?
        .with_retries(config.retries, RETRY_BACKOFF);

    let walker = Walker::new(
        BugTracker::new(http.clone(), &config.repository),
        WalkOptions {
            max_depth: config.max_depth,
            after: config.after,
            show_progress: config.show_progress(),
        },
    );
    let outcome = walker
        .walk(&config.root_bug)
        .await
        .with_context(|| format!("Failed to walk the dependencies of {}", config.root_bug))?;

    let aggregator = Aggregator::new(
        ArtifactCache::new(&config.cache_dir, !config.disable_cache),
        RevisionServer::new(http, config.repository.clone()),
        Diffstat::new(&config.diffstat),
    )
    .with_progress(config.show_progress());

    aggregator
        .aggregate(&outcome)
        .await
        .context("Failed to aggregate patch statistics")
}

pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_run_summary(config: &RunConfig) {
    eprintln!("\n{} Walking {}", "→".blue(), config.root_bug.bright_white());
    eprintln!("Max depth: {}", config.max_depth);
    if let Some(after) = config.after {
        eprintln!("Fixed on or after: {}", after);
    }
    let cache = if config.disable_cache {
        "disabled (re-download everything)".to_string()
    } else {
        config.cache_dir.display().to_string()
    };
    eprintln!("Cache: {}\n", cache);
}

pub async fn handle_run(matches: &ArgMatches) {
    init_tracing(matches.get_flag("verbose"));

    let config = match config_from_matches(matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    if !matches.get_flag("quiet") {
        print_run_summary(&config);
    }

    let report = match run(&config).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
    };

    let format = matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = matches.get_one::<PathBuf>("output");

    if output.is_some() {
        colored::control::set_override(false);
    }
    let content = match generate_report(&report, format) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => write_report(&content, path),
        None => print!("{}", content),
    }
}

fn write_report(content: &str, path: &Path) {
    if let Err(e) = save_report(content, path) {
        eprintln!("✗ Failed to write report to {}: {}", path.display(), e);
        std::process::exit(1);
    }
    eprintln!("{} Report saved to {}", "✓".green().bold(), path.display());
}
