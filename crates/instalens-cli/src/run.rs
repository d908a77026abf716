//! `run`: local multi-profile scrape into one combined table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use instalens_core::{write_table, AppConfig, DateWindow, ProfileTarget};
use instalens_scraper::{
    ChromiumSessionFactory, Orchestrator, ProfileOutcome, ScrapeSettings, SessionCredentials,
    Timing,
};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Comma-separated handles, `@handles`, or profile URLs
    pub profiles: String,
    /// First day of the window, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day of the window, `YYYY-MM-DD`
    pub end_date: String,
    /// Name of the person running the scrape
    pub operator: String,
    /// Output file name, written as `<output_dir>/<output>.csv`
    pub output: String,
}

/// Parse and validate the profile list and window before any browser starts.
pub(crate) fn resolve_inputs(
    profiles: &str,
    start_date: &str,
    end_date: &str,
    base_url: &str,
) -> anyhow::Result<(Vec<ProfileTarget>, DateWindow)> {
    let targets = ProfileTarget::parse_list(profiles, base_url)?;
    if targets.is_empty() {
        anyhow::bail!("no profiles given; pass a comma-separated list of handles or URLs");
    }
    let window = DateWindow::parse(start_date, end_date)?;
    Ok((targets, window))
}

/// `<dir>/<identifier>.csv`. An identifier that already ends in `.csv` is
/// used as is.
pub(crate) fn output_path(dir: &Path, identifier: &str) -> PathBuf {
    let identifier = identifier.trim();
    if identifier.to_ascii_lowercase().ends_with(".csv") {
        dir.join(identifier)
    } else {
        dir.join(format!("{identifier}.csv"))
    }
}

/// Scrape every profile and write the combined table.
///
/// # Errors
///
/// Returns an error for an empty profile list, invalid dates, missing
/// credentials, when every profile fails, or when the table cannot be
/// written. Individual profile failures are reported and skipped.
pub(crate) async fn run_scrape(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let (targets, window) =
        resolve_inputs(&args.profiles, &args.start_date, &args.end_date, &config.base_url)?;
    let credentials = SessionCredentials::from_config(config)?;

    tracing::info!(
        operator = %args.operator,
        profiles = targets.len(),
        start = %window.start(),
        end = %window.end(),
        "scrape requested"
    );

    let settings = ScrapeSettings {
        base_url: config.base_url.clone(),
        timing: Timing::from_config(config),
        diagnostics_dir: config.diagnostics_dir.clone(),
        work_dir: config.output_dir.clone(),
    };
    let factory = Arc::new(ChromiumSessionFactory::from_config(config));
    let orchestrator = Orchestrator::new(
        factory,
        credentials,
        settings,
        config.max_concurrent_profiles,
    );

    let report = orchestrator.run(&targets, window).await;

    for outcome in &report.outcomes {
        match outcome {
            ProfileOutcome::Succeeded {
                profile,
                posts_visited,
                rows,
            } => println!("ok      {profile}: {rows} comments from {posts_visited} posts"),
            ProfileOutcome::Failed { profile, reason } => {
                eprintln!("failed  {profile}: {reason}");
            }
        }
    }

    if report.all_failed() {
        anyhow::bail!("all {} profiles failed; no table written", report.outcomes.len());
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("failed to create output dir {}", config.output_dir.display())
    })?;
    let path = output_path(&config.output_dir, &args.output);
    write_table(&path, &report.rows)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "wrote {} rows to {} ({} of {} profiles failed)",
        report.rows.len(),
        path.display(),
        report.failed_count(),
        report.outcomes.len()
    );
    Ok(())
}
