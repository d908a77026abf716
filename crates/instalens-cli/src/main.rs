mod annotate;
mod dispatch;
mod run;
mod summary;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::annotate::AnnotateArgs;
use crate::dispatch::DispatchArgs;
use crate::run::RunArgs;
use crate::summary::SummaryArgs;

#[derive(Debug, Parser)]
#[command(name = "instalens", version)]
#[command(about = "Collect profile comments, label their sentiment, and summarize the result")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape profiles in local browsers and write the combined comment table
    Run(RunArgs),
    /// Attach sentiment labels to a combined comment table
    Annotate(AnnotateArgs),
    /// Run the scraper remotely through the repository workflow and download its table
    Dispatch(DispatchArgs),
    /// Print a markdown summary of an annotated table
    Summary(SummaryArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Usage errors exit 1; --help and --version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    dotenvy::dotenv().ok();
    let config = instalens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run(args) => run::run_scrape(&config, &args).await,
        Commands::Annotate(args) => {
            annotate::run_annotate(&args.input, args.output.as_deref()).await
        }
        Commands::Dispatch(args) => dispatch::run_dispatch(&config, &args).await,
        Commands::Summary(args) => summary::run_summary(&args.input),
    }
}
