//! `annotate`: sentiment labels for a combined comment table.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use instalens_core::{read_table, write_table, CommentRow};
use instalens_sentiment::{
    annotate_rows, AnnotationReport, Preprocessor, Rules, SentimentClassifier, SentimentConfig,
    TeiClassifier,
};

#[derive(Debug, Args)]
pub struct AnnotateArgs {
    /// Combined comment table to annotate
    pub input: PathBuf,
    /// Where to write the annotated table [default: <input stem>_annotated.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// `dir/name.csv` becomes `dir/name_annotated.csv`.
pub(crate) fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "comments".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_annotated.csv"))
}

/// Read `input`, classify every comment, and write the annotated table.
///
/// # Errors
///
/// Returns an error if either table cannot be read or written. Per-row
/// classification failures are logged and leave that row unannotated.
pub(crate) async fn annotate_file(
    input: &Path,
    output: &Path,
    classifier: &dyn SentimentClassifier,
    preprocessor: &Preprocessor,
) -> anyhow::Result<AnnotationReport> {
    let rows: Vec<CommentRow> =
        read_table(input).with_context(|| format!("failed to read {}", input.display()))?;
    let report = annotate_rows(rows, classifier, preprocessor).await;
    write_table(output, &report.rows)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(report)
}

/// # Errors
///
/// Returns an error if the sentiment config is missing, the rules file is
/// invalid, or the tables cannot be read or written.
pub(crate) async fn run_annotate(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let config = SentimentConfig::from_env()?;
    let rules = Rules::load_or_default(config.rules_path.as_deref())?;
    let preprocessor = Preprocessor::new(&rules)?;
    let classifier = TeiClassifier::new(&config.tei_url, config.timeout())
        .context("failed to build TEI client")?;

    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    let report = annotate_file(input, &output, &classifier, &preprocessor).await?;

    tracing::info!(
        annotated = report.annotated,
        skipped = report.skipped,
        failed = report.failed,
        "annotation complete"
    );
    println!(
        "annotated {} of {} rows ({} blank, {} failed) -> {}",
        report.annotated,
        report.rows.len(),
        report.skipped,
        report.failed,
        output.display()
    );
    Ok(())
}
