//! `summary`: markdown overview of an annotated table.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use instalens_core::{read_table, AnnotatedCommentRow, SentimentLabel};

const TOP_HASHTAGS: usize = 10;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Annotated comment table
    pub input: PathBuf,
}

/// Percentages of comments per label. Comments without a label count toward
/// the total but no bucket, so the three need not sum to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SentimentShare {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Totals {
    pub posts: u64,
    pub likes: u64,
    pub comments: u64,
    pub sentiment: SentimentShare,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Summary {
    pub overall: Totals,
    /// Most frequent first; ties keep first-seen order.
    pub top_hashtags: Vec<(String, u64)>,
    /// Sorted by profile handle.
    pub profiles: Vec<(String, Totals)>,
}

/// Like count of a cell: separators stripped, anything non-numeric is zero.
fn likes_value(cell: &str) -> u64 {
    cell.replace(',', "").trim().parse().unwrap_or(0)
}

fn has_comment(row: &AnnotatedCommentRow) -> bool {
    !row.comments.trim().is_empty()
}

#[allow(clippy::cast_precision_loss)]
fn totals<'a>(rows: impl IntoIterator<Item = &'a AnnotatedCommentRow>) -> Totals {
    let mut urls = HashSet::new();
    let mut likes = 0u64;
    let mut comments = 0u64;
    let mut counts = [0u64; 3];

    for row in rows {
        if !row.url.is_empty() {
            urls.insert(row.url.as_str());
        }
        likes += likes_value(&row.likes);
        if has_comment(row) {
            comments += 1;
            match row.sentiment_label {
                Some(SentimentLabel::Positive) => counts[0] += 1,
                Some(SentimentLabel::Negative) => counts[1] += 1,
                Some(SentimentLabel::Neutral) => counts[2] += 1,
                None => {}
            }
        }
    }

    let pct = |n: u64| {
        if comments == 0 {
            0.0
        } else {
            n as f64 * 100.0 / comments as f64
        }
    };
    Totals {
        posts: urls.len() as u64,
        likes,
        comments,
        sentiment: SentimentShare {
            positive: pct(counts[0]),
            negative: pct(counts[1]),
            neutral: pct(counts[2]),
        },
    }
}

fn top_hashtags(rows: &[AnnotatedCommentRow], limit: usize) -> Vec<(String, u64)> {
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for tag in rows
        .iter()
        .flat_map(|r| r.hashtags.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        if let Some(&i) = index.get(tag) {
            order[i].1 += 1;
        } else {
            index.insert(tag.to_string(), order.len());
            order.push((tag.to_string(), 1));
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(limit);
    order
}

pub(crate) fn summarize(rows: &[AnnotatedCommentRow]) -> Summary {
    let mut by_profile: BTreeMap<&str, Vec<&AnnotatedCommentRow>> = BTreeMap::new();
    for row in rows {
        by_profile.entry(row.username.as_str()).or_default().push(row);
    }
    Summary {
        overall: totals(rows),
        top_hashtags: top_hashtags(rows, TOP_HASHTAGS),
        profiles: by_profile
            .into_iter()
            .map(|(name, rows)| (name.to_string(), totals(rows)))
            .collect(),
    }
}

/// Group digits the Indian way: the last three, then pairs (`12,34,567`).
pub(crate) fn format_indian_number(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{last3}", groups.join(","))
}

fn share_cell(share: &SentimentShare) -> String {
    format!(
        "{:.1}% / {:.1}% / {:.1}%",
        share.positive, share.negative, share.neutral
    )
}

pub(crate) fn render_markdown(
    out: &mut impl fmt::Write,
    source: &str,
    summary: &Summary,
) -> fmt::Result {
    let overall = &summary.overall;
    writeln!(out, "# Comment Summary")?;
    writeln!(out)?;
    writeln!(out, "**Source**: {source}")?;
    writeln!(out, "**Generated**: {}", Utc::now().format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out)?;
    writeln!(out, "## Overall")?;
    writeln!(out)?;
    writeln!(out, "- **Total Posts**: {}", format_indian_number(overall.posts))?;
    writeln!(out, "- **Total Likes**: {}", format_indian_number(overall.likes))?;
    writeln!(out, "- **Total Comments**: {}", format_indian_number(overall.comments))?;
    writeln!(
        out,
        "- **Sentiment** (positive / negative / neutral): {}",
        share_cell(&overall.sentiment)
    )?;
    writeln!(out)?;
    writeln!(out, "## Top Hashtags")?;
    writeln!(out)?;
    if summary.top_hashtags.is_empty() {
        writeln!(out, "_No hashtags._")?;
    } else {
        writeln!(out, "| Hashtag | Frequency |")?;
        writeln!(out, "|---------|-----------|")?;
        for (tag, count) in &summary.top_hashtags {
            writeln!(out, "| {tag} | {} |", format_indian_number(*count))?;
        }
    }
    writeln!(out)?;
    writeln!(out, "## Profiles")?;
    writeln!(out)?;
    writeln!(out, "| Profile | Posts | Likes | Comments | Positive / Negative / Neutral |")?;
    writeln!(out, "|---------|-------|-------|----------|-------------------------------|")?;
    for (name, totals) in &summary.profiles {
        writeln!(
            out,
            "| {name} | {} | {} | {} | {} |",
            format_indian_number(totals.posts),
            format_indian_number(totals.likes),
            format_indian_number(totals.comments),
            share_cell(&totals.sentiment)
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the table cannot be read.
pub(crate) fn run_summary(input: &Path) -> anyhow::Result<()> {
    let rows: Vec<AnnotatedCommentRow> =
        read_table(input).with_context(|| format!("failed to read {}", input.display()))?;
    if rows.is_empty() {
        println!("no rows in {}; nothing to summarize", input.display());
        return Ok(());
    }
    let mut text = String::new();
    render_markdown(&mut text, &input.display().to_string(), &summarize(&rows))
        .context("failed to render summary")?;
    print!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        user: &str,
        url: &str,
        likes: &str,
        hashtags: &str,
        comment: &str,
        label: Option<SentimentLabel>,
    ) -> AnnotatedCommentRow {
        AnnotatedCommentRow {
            username: user.to_string(),
            url: url.to_string(),
            likes: likes.to_string(),
            hashtags: hashtags.to_string(),
            comments: comment.to_string(),
            sentiment_label: label,
            ..AnnotatedCommentRow::default()
        }
    }

    fn sample() -> Vec<AnnotatedCommentRow> {
        use SentimentLabel::{Negative, Neutral, Positive};
        vec![
            row("insta_b", "u1", "1,200", "#launch, #drop", "love it", Some(Positive)),
            row("insta_b", "u1", "", "", "meh", Some(Neutral)),
            row("insta_b", "u2", "Hidden", "#drop", "worst", Some(Negative)),
            row("insta_a", "u3", "300", "#drop, #sale", "super", Some(Positive)),
            row("insta_a", "u3", "", "", "", None),
        ]
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(format_indian_number(0), "0");
        assert_eq!(format_indian_number(999), "999");
        assert_eq!(format_indian_number(1_000), "1,000");
        assert_eq!(format_indian_number(123_456), "1,23,456");
        assert_eq!(format_indian_number(1_234_567), "12,34,567");
        assert_eq!(format_indian_number(123_456_789), "12,34,56,789");
    }

    #[test]
    fn likes_ignore_separators_and_text() {
        assert_eq!(likes_value("1,024"), 1024);
        assert_eq!(likes_value("Hidden"), 0);
        assert_eq!(likes_value(""), 0);
    }

    #[test]
    fn overall_totals() {
        let summary = summarize(&sample());
        let overall = &summary.overall;
        assert_eq!(overall.posts, 3);
        assert_eq!(overall.likes, 1_500);
        assert_eq!(overall.comments, 4);
        assert!((overall.sentiment.positive - 50.0).abs() < 1e-9);
        assert!((overall.sentiment.negative - 25.0).abs() < 1e-9);
        assert!((overall.sentiment.neutral - 25.0).abs() < 1e-9);
    }

    #[test]
    fn hashtags_ranked_by_frequency_then_first_seen() {
        let summary = summarize(&sample());
        assert_eq!(
            summary.top_hashtags,
            [
                ("#drop".to_string(), 3),
                ("#launch".to_string(), 1),
                ("#sale".to_string(), 1)
            ]
        );
    }

    #[test]
    fn hashtags_capped_at_ten() {
        let rows: Vec<AnnotatedCommentRow> = (0..15)
            .map(|i| row("a", "u", "", &format!("#t{i}"), "x", None))
            .collect();
        assert_eq!(top_hashtags(&rows, TOP_HASHTAGS).len(), 10);
    }

    #[test]
    fn profiles_sorted_by_handle() {
        let summary = summarize(&sample());
        let names: Vec<&str> = summary.profiles.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["insta_a", "insta_b"]);

        let insta_a = &summary.profiles[0].1;
        assert_eq!(insta_a.posts, 1);
        assert_eq!(insta_a.likes, 300);
        assert_eq!(insta_a.comments, 1);
        assert!((insta_a.sentiment.positive - 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_comments_means_zero_shares() {
        let summary = summarize(&[row("a", "u", "5", "", "", None)]);
        assert_eq!(summary.overall.sentiment, SentimentShare::default());
    }

    #[test]
    fn markdown_has_sections_and_grouped_numbers() {
        let mut rows = sample();
        rows[0].likes = "1,23,400".to_string();
        let mut text = String::new();
        render_markdown(&mut text, "combined.csv", &summarize(&rows)).unwrap();
        assert!(text.contains("**Source**: combined.csv"));
        assert!(text.contains("- **Total Likes**: 1,23,700"), "{text}");
        assert!(text.contains("| #drop | 3 |"));
        assert!(text.contains("| insta_b | 2 | 1,23,400 | 3 | 33.3% / 33.3% / 33.3% |"), "{text}");
    }

    struct ClosedSink;

    impl fmt::Write for ClosedSink {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn markdown_write_failure_is_returned() {
        let result = render_markdown(&mut ClosedSink, "combined.csv", &summarize(&sample()));
        assert!(result.is_err());
    }
}
