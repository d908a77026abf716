//! Batch annotation of comment rows.

use instalens_core::{AnnotatedCommentRow, CommentRow};

use crate::classifier::SentimentClassifier;
use crate::emoji::strip_emoji;
use crate::preprocess::Preprocessor;

/// Annotated rows plus tallies for logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationReport {
    pub rows: Vec<AnnotatedCommentRow>,
    pub annotated: usize,
    /// Blank comments, left without sentiment.
    pub skipped: usize,
    /// Rows whose classification failed.
    pub failed: usize,
}

/// Text sent to the classifier for `comment`, or `None` when it is blank.
///
/// Emoji are stripped first. When that leaves nothing, the original text is
/// normalized instead so the emoji polarity tokens still reach the model.
/// Text that normalizes to nothing is sent trimmed but otherwise as typed.
#[must_use]
pub fn classification_input(comment: &str, preprocessor: &Preprocessor) -> Option<String> {
    if comment.trim().is_empty() {
        return None;
    }
    let stripped = strip_emoji(comment);
    let source = if stripped.is_empty() {
        comment
    } else {
        stripped.as_str()
    };
    let processed = preprocessor.preprocess(source);
    if processed.trim().is_empty() {
        Some(comment.trim().to_string())
    } else {
        Some(processed)
    }
}

/// Classify every row's comment, one at a time, in input order.
///
/// The comment column is carried through unchanged. A classifier failure
/// on one row is logged and leaves that row's sentiment empty.
pub async fn annotate_rows(
    rows: Vec<CommentRow>,
    classifier: &dyn SentimentClassifier,
    preprocessor: &Preprocessor,
) -> AnnotationReport {
    let mut report = AnnotationReport {
        rows: Vec::with_capacity(rows.len()),
        ..AnnotationReport::default()
    };

    for (index, row) in rows.into_iter().enumerate() {
        let Some(input) = classification_input(&row.comments, preprocessor) else {
            report.skipped += 1;
            report.rows.push(AnnotatedCommentRow::unannotated(row));
            continue;
        };

        match classifier.classify(&input).await {
            Ok(prediction) => {
                report.annotated += 1;
                report.rows.push(AnnotatedCommentRow::annotated(
                    row,
                    prediction.label,
                    prediction.confidence,
                ));
            }
            Err(e) => {
                tracing::warn!(
                    row = index + 1,
                    profile = %row.username,
                    post = row.post_number,
                    error = %e,
                    "sentiment classification failed"
                );
                report.failed += 1;
                report.rows.push(AnnotatedCommentRow::unannotated(row));
            }
        }
    }

    tracing::info!(
        annotated = report.annotated,
        skipped = report.skipped,
        failed = report.failed,
        "sentiment annotation complete"
    );
    report
}
