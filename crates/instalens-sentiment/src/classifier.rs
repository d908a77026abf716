//! Three-way sentiment classification behind a trait, with a TEI-backed
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use instalens_core::SentimentLabel;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;

/// A label and its probability as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: SentimentLabel,
    /// In `[0, 100]`.
    pub confidence: f32,
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify already-normalized text.
    async fn classify(&self, text: &str) -> Result<Prediction, SentimentError>;
}

/// Client for a text-embeddings-inference server running a sequence
/// classification model with `negative`, `neutral`, `positive` outputs.
pub struct TeiClassifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    raw_scores: bool,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Single(Vec<LabelScore>),
    Batch(Vec<Vec<LabelScore>>),
}

impl TeiClassifier {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(tei_url: &str, timeout: Duration) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/predict", tei_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SentimentClassifier for TeiClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction, SentimentError> {
        let request = PredictRequest {
            inputs: text,
            raw_scores: true,
            truncate: true,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SentimentError::Tei(format!("TEI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::Tei(format!(
                "TEI returned status {}",
                response.status()
            )));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::Tei(format!("TEI response parse error: {e}")))?;
        let scores = match body {
            PredictResponse::Single(scores) => scores,
            PredictResponse::Batch(mut batch) => {
                if batch.len() != 1 {
                    return Err(SentimentError::Tei(format!(
                        "TEI returned {} predictions for 1 input",
                        batch.len()
                    )));
                }
                batch.remove(0)
            }
        };

        let logits = logits_from_scores(&scores)?;
        Ok(predict(logits))
    }
}

/// `LABEL_<i>` or a label name to its classifier index.
fn label_index(label: &str) -> Option<usize> {
    if let Some(index) = label.strip_prefix("LABEL_") {
        return index.parse().ok().filter(|i| *i < SentimentLabel::ALL.len());
    }
    let label: SentimentLabel = label.parse().ok()?;
    SentimentLabel::ALL.iter().position(|l| *l == label)
}

fn logits_from_scores(scores: &[LabelScore]) -> Result<[f64; 3], SentimentError> {
    let mut logits = [None; 3];
    for entry in scores {
        let index = label_index(&entry.label).ok_or_else(|| {
            SentimentError::Tei(format!("unexpected label '{}'", entry.label))
        })?;
        logits[index] = Some(entry.score);
    }

    let mut out = [0.0; 3];
    for (index, logit) in logits.into_iter().enumerate() {
        out[index] = logit.ok_or_else(|| {
            SentimentError::Tei(format!(
                "missing score for {}",
                SentimentLabel::ALL[index]
            ))
        })?;
    }
    Ok(out)
}

/// Softmax over the logits, then argmax. Ties go to the lower index.
fn predict(logits: [f64; 3]) -> Prediction {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = logits.map(|l| (l - max).exp());
    let total: f64 = exps.iter().sum();

    let best = exps
        .iter()
        .enumerate()
        .fold(0, |best, (index, e)| if *e > exps[best] { index } else { best });

    #[allow(clippy::cast_possible_truncation)]
    let confidence = (exps[best] / total * 100.0) as f32;
    Prediction {
        label: SentimentLabel::ALL[best],
        confidence,
    }
}
