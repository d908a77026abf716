//! `dispatch`: run the scraper through the repository workflow and download
//! the table it uploads.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use instalens_core::{write_table, AppConfig, ProfileTarget};
use instalens_dispatch::{artifact_name, DispatchClient, DispatchConfig, DispatchInputs};

use crate::run::resolve_inputs;

#[derive(Debug, Args)]
pub struct DispatchArgs {
    /// Comma-separated handles, `@handles`, or profile URLs
    pub profiles: String,
    /// First day of the window, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day of the window, `YYYY-MM-DD`
    pub end_date: String,
    /// Name of the person running the scrape
    pub operator: String,
    /// Where to write the downloaded table [default: <artifact name>.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Also write the annotated table next to the output
    #[arg(long)]
    pub annotate: bool,
}

/// Validate the request locally and build the workflow inputs. Profiles are
/// sent as their normalized handles.
pub(crate) fn build_inputs(args: &DispatchArgs, base_url: &str) -> anyhow::Result<DispatchInputs> {
    let (targets, window) = resolve_inputs(&args.profiles, &args.start_date, &args.end_date, base_url)?;
    let operator = args.operator.trim();
    if operator.is_empty() {
        anyhow::bail!("operator name must not be empty");
    }
    Ok(DispatchInputs {
        profile_url: targets
            .iter()
            .map(ProfileTarget::handle)
            .collect::<Vec<_>>()
            .join(","),
        start_date: window.start().format("%Y-%m-%d").to_string(),
        end_date: window.end().format("%Y-%m-%d").to_string(),
        username: operator.to_string(),
        artifact_name: artifact_name(operator),
    })
}

/// # Errors
///
/// Returns an error for invalid input, missing dispatch config, any
/// workflow or artifact failure, or when the table cannot be written.
pub(crate) async fn run_dispatch(config: &AppConfig, args: &DispatchArgs) -> anyhow::Result<()> {
    let inputs = build_inputs(args, &config.base_url)?;
    let dispatch_config = DispatchConfig::from_env()?;
    let client = DispatchClient::new(&dispatch_config).context("failed to build GitHub client")?;

    println!(
        "dispatching {} on {} for {} ({} to {})",
        dispatch_config.workflow,
        dispatch_config.repo,
        inputs.profile_url,
        inputs.start_date,
        inputs.end_date
    );
    let rows = client
        .dispatch_and_collect(&inputs)
        .await
        .context("remote scrape failed")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.csv", inputs.artifact_name)));
    write_table(&output, &rows).with_context(|| format!("failed to write {}", output.display()))?;
    println!("wrote {} rows to {}", rows.len(), output.display());

    if args.annotate {
        crate::annotate::run_annotate(&output, None).await?;
    }
    Ok(())
}
