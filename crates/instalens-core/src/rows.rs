use serde::{Deserialize, Serialize};

/// Column order of the combined comment table.
pub const COMMENT_COLUMNS: &[&str] = &[
    "username",
    "Post_Number",
    "URL",
    "Date",
    "Time",
    "Likes",
    "Caption",
    "Hashtags",
    "Comments",
];

/// Column order of the annotated table.
pub const ANNOTATED_COLUMNS: &[&str] = &[
    "username",
    "Post_Number",
    "URL",
    "Date",
    "Time",
    "Likes",
    "Caption",
    "Hashtags",
    "Comments",
    "Sentiment_label",
    "Confidence_score",
    "Sentiment_score",
];

/// A type that is stored as one CSV row with a fixed header.
pub trait TableRow: Serialize + for<'de> Deserialize<'de> {
    const COLUMNS: &'static [&'static str];
}

/// One comment, flattened with its post's metadata.
///
/// `date`, `time`, `likes`, `caption`, and `hashtags` are filled only on the
/// first row of each post and are empty strings on the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRow {
    pub username: String,
    #[serde(rename = "Post_Number")]
    pub post_number: u32,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Likes")]
    pub likes: String,
    #[serde(rename = "Caption")]
    pub caption: String,
    #[serde(rename = "Hashtags")]
    pub hashtags: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

impl CommentRow {
    /// True when this row carries its post's metadata.
    #[must_use]
    pub fn has_post_metadata(&self) -> bool {
        !self.date.is_empty()
    }
}

impl TableRow for CommentRow {
    const COLUMNS: &'static [&'static str] = COMMENT_COLUMNS;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Classifier output order.
    pub const ALL: [SentimentLabel; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }

    /// Signed score: negative is -1, neutral 0, positive 1.
    #[must_use]
    pub fn score(self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Neutral => 0,
            Self::Positive => 1,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            other => Err(format!("unknown sentiment label '{other}'")),
        }
    }
}

/// A [`CommentRow`] plus sentiment columns. The sentiment fields are `None`
/// (empty cells) for rows whose comment text is blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCommentRow {
    pub username: String,
    #[serde(rename = "Post_Number")]
    pub post_number: u32,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Likes")]
    pub likes: String,
    #[serde(rename = "Caption")]
    pub caption: String,
    #[serde(rename = "Hashtags")]
    pub hashtags: String,
    #[serde(rename = "Comments")]
    pub comments: String,
    #[serde(rename = "Sentiment_label")]
    pub sentiment_label: Option<SentimentLabel>,
    /// Percentage in `[0, 100]`.
    #[serde(rename = "Confidence_score")]
    pub confidence_score: Option<f32>,
    #[serde(rename = "Sentiment_score")]
    pub sentiment_score: Option<i8>,
}

impl AnnotatedCommentRow {
    #[must_use]
    pub fn unannotated(row: CommentRow) -> Self {
        Self {
            username: row.username,
            post_number: row.post_number,
            url: row.url,
            date: row.date,
            time: row.time,
            likes: row.likes,
            caption: row.caption,
            hashtags: row.hashtags,
            comments: row.comments,
            sentiment_label: None,
            confidence_score: None,
            sentiment_score: None,
        }
    }

    #[must_use]
    pub fn annotated(row: CommentRow, label: SentimentLabel, confidence: f32) -> Self {
        Self {
            sentiment_label: Some(label),
            confidence_score: Some(confidence.clamp(0.0, 100.0)),
            sentiment_score: Some(label.score()),
            ..Self::unannotated(row)
        }
    }
}

impl TableRow for AnnotatedCommentRow {
    const COLUMNS: &'static [&'static str] = ANNOTATED_COLUMNS;
}
