use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier error: {0}")]
    Tei(String),

    #[error("invalid rules in {source_name}: {reason}")]
    Rules { source_name: String, reason: String },

    #[error("invalid rule pattern '{word}': {source}")]
    Pattern {
        word: String,
        #[source]
        source: regex::Error,
    },
}
