//! Sentiment labeling for scraped comment tables.
//!
//! Comments are emoji-stripped, normalized with a code-mixed
//! Telugu/English rule set, and classified into negative, neutral, or
//! positive by a model served over HTTP.

pub mod annotate;
pub mod classifier;
pub mod config;
pub mod emoji;
pub mod error;
pub mod preprocess;
pub mod rules;

pub use annotate::{annotate_rows, classification_input, AnnotationReport};
pub use classifier::{Prediction, SentimentClassifier, TeiClassifier};
pub use config::SentimentConfig;
pub use error::SentimentError;
pub use preprocess::{contains_telugu, Preprocessor};
pub use rules::Rules;
