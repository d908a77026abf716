//! Post records and their flattening into comment rows.

use instalens_core::{CommentRow, LikeCount, PostedAt};

const HASHTAG_DELIMITER: &str = ", ";

/// Everything read from one post before the viewer advances.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub url: String,
    pub sequence_number: u32,
    pub posted_at: PostedAt,
    pub like_count: LikeCount,
    /// Caption with hashtag tokens removed.
    pub caption: String,
    /// Ordered, de-duplicated, first appearance wins.
    pub hashtags: Vec<String>,
    pub comments: Vec<String>,
}

/// Post metadata read before the thread.
#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub url: String,
    pub sequence_number: u32,
    pub posted_at: PostedAt,
    pub like_count: LikeCount,
}

impl PostRecord {
    /// Build a record from the raw thread entries.
    ///
    /// Entry 0 is always taken as the caption. When the caption element was
    /// missing, that means the first real comment is consumed as the caption
    /// and does not become a row.
    #[must_use]
    pub fn from_entries(meta: PostMeta, entries: Vec<String>) -> Self {
        let mut entries = entries.into_iter();
        let (caption, hashtags) = entries
            .next()
            .map(|first| split_hashtags(&first))
            .unwrap_or_default();

        Self {
            url: meta.url,
            sequence_number: meta.sequence_number,
            posted_at: meta.posted_at,
            like_count: meta.like_count,
            caption,
            hashtags,
            comments: entries.collect(),
        }
    }
}

/// Split caption text into (remaining words, hashtags).
///
/// Whitespace-delimited tokens starting with `#` are hashtags; the rest are
/// rejoined with single spaces in their original order.
#[must_use]
pub fn split_hashtags(caption: &str) -> (String, Vec<String>) {
    let mut words = Vec::new();
    let mut hashtags: Vec<String> = Vec::new();
    for token in caption.split_whitespace() {
        if token.starts_with('#') {
            if !hashtags.iter().any(|h| h == token) {
                hashtags.push(token.to_string());
            }
        } else {
            words.push(token);
        }
    }
    (words.join(" "), hashtags)
}

/// One row per comment; only the first row carries the post's metadata.
#[must_use]
pub fn assemble_rows(record: &PostRecord, username: &str) -> Vec<CommentRow> {
    record
        .comments
        .iter()
        .enumerate()
        .map(|(index, comment)| {
            let mut row = CommentRow {
                username: username.to_string(),
                post_number: record.sequence_number,
                url: record.url.clone(),
                comments: comment.clone(),
                ..CommentRow::default()
            };
            if index == 0 {
                row.date = record.posted_at.date_cell();
                row.time = record.posted_at.time_cell();
                row.likes = record.like_count.cell();
                row.caption.clone_from(&record.caption);
                row.hashtags = record.hashtags.join(HASHTAG_DELIMITER);
            }
            row
        })
        .collect()
}
